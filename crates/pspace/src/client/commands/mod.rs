use std::path::Path;

use anyhow::Context;

use crate::Map;
use crate::common::config::{Config, parse_conf};
use crate::common::pspace::{ParameterSets, compute_psets, filter_psets};
use crate::pbs::qstat::QueueData;

pub mod completion;
pub mod create;
pub mod delete;
pub mod info;
pub mod list;
pub mod purge;
pub mod submit;
pub mod users;

/// Reads the configuration at `path` and computes its parameter sets,
/// restricted by the `--param` option.
pub fn load_psets(path: &Path, param: &str, cwd: &Path) -> anyhow::Result<(Config, ParameterSets)> {
    let conf = parse_conf(path)?;
    let psets = compute_psets(&conf, cwd)
        .with_context(|| format!("{}: cannot compute parameter sets", path.display()))?;
    let psets = filter_psets(psets, param, &conf.pnames)?;
    Ok((conf, psets))
}

/// Name of the directory that holds the configuration file.
pub fn conf_dirname(conf: &Config) -> String {
    conf.dir()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

/// Maps job names to the id of the first job with that name.
pub fn jobs_by_name(qdata: &QueueData) -> Map<&str, &str> {
    let mut jobs = Map::new();
    for (job_id, job) in qdata {
        jobs.entry(job.name.as_str()).or_insert(job_id.as_str());
    }
    jobs
}

/// Keeps only the jobs owned by `user`.
pub fn jobs_of_user(qdata: QueueData, user: &str) -> QueueData {
    qdata
        .into_iter()
        .filter(|(_, job)| job.user() == user)
        .collect()
}

/// Login name of the current user.
pub fn current_user() -> String {
    match nix::unistd::User::from_uid(nix::unistd::getuid()) {
        Ok(Some(user)) => user.name,
        _ => std::env::var("USER").unwrap_or_default(),
    }
}
