pub mod qstat;
pub mod script;

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::Context;
use bstr::ByteSlice;

use crate::common::utils::process::{check_command_output, create_command};
use crate::pbs::qstat::{QueueData, SimpleJobRecord, parse_qstat_full, parse_qstat_simple};

pub type BatchFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + 'a>>;

/// Access to the batch system that runs the jobs of the parameter sets.
pub trait BatchSystem {
    /// Full information about all jobs in the queue (`qstat -f1`).
    fn job_status(&self) -> BatchFuture<'_, QueueData>;

    /// Short listing of all jobs in the queue (`qstat`).
    fn job_list(&self) -> BatchFuture<'_, Vec<SimpleJobRecord>>;

    /// Submits a job script from `workdir` and returns the id of the new job.
    fn submit_job<'a>(&'a self, script: &'a str, workdir: &'a Path) -> BatchFuture<'a, String>;

    /// Deletes a job, granting it `delay` seconds between SIGTERM and SIGKILL.
    fn delete_job<'a>(&'a self, job_id: &'a str, delay: u32, workdir: &'a Path)
    -> BatchFuture<'a, ()>;
}

/// Name prefix of the temporary job scripts passed to `qsub`.
const JOB_SCRIPT_PREFIX: &str = "pspace-job-";

pub struct PbsBatchSystem {
    workdir: PathBuf,
}

impl PbsBatchSystem {
    /// `workdir` is used for commands that do not relate to a configuration.
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }
}

async fn run_pbs_command(arguments: &[&str], workdir: &Path) -> anyhow::Result<String> {
    let program = arguments[0];
    which::which(program)
        .with_context(|| format!("{program} not found, is PBS installed on this node?"))?;

    log::debug!("Running PBS command `{}`", arguments.join(" "));
    let output = create_command(arguments, workdir)
        .output()
        .await
        .with_context(|| format!("{program} start failed"))?;
    let output =
        check_command_output(output).with_context(|| format!("{program} execution failed"))?;
    let stdout = output
        .stdout
        .to_str()
        .map_err(|e| anyhow::anyhow!("Invalid UTF-8 {} output: {:?}", program, e))?;
    log::trace!("{program} output\n{stdout}");
    Ok(stdout.to_string())
}

impl BatchSystem for PbsBatchSystem {
    fn job_status(&self) -> BatchFuture<'_, QueueData> {
        Box::pin(async move {
            let output = run_pbs_command(&["qstat", "-f1"], &self.workdir).await?;
            parse_qstat_full(&output)
        })
    }

    fn job_list(&self) -> BatchFuture<'_, Vec<SimpleJobRecord>> {
        Box::pin(async move {
            let output = run_pbs_command(&["qstat"], &self.workdir).await?;
            parse_qstat_simple(&output)
        })
    }

    fn submit_job<'a>(&'a self, script: &'a str, workdir: &'a Path) -> BatchFuture<'a, String> {
        Box::pin(async move {
            let mut file = tempfile::Builder::new()
                .prefix(JOB_SCRIPT_PREFIX)
                .suffix(".sh")
                .tempfile_in(workdir)
                .with_context(|| format!("Cannot create job script in {}", workdir.display()))?;
            file.write_all(script.as_bytes())
                .context("Cannot write job script")?;
            let path = file.path().display().to_string();

            let output = run_pbs_command(&["qsub", &path], workdir).await?;
            let job_id = output.trim();
            if job_id.is_empty() {
                anyhow::bail!("qsub did not return a job id");
            }
            Ok(job_id.to_string())
        })
    }

    fn delete_job<'a>(
        &'a self,
        job_id: &'a str,
        delay: u32,
        workdir: &'a Path,
    ) -> BatchFuture<'a, ()> {
        Box::pin(async move {
            let delay = format!("-W{delay}");
            run_pbs_command(&["qdel", &delay, job_id], workdir).await?;
            Ok(())
        })
    }
}
