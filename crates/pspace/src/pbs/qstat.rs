//! Parsing of `qstat` outputs.
use serde::Serialize;

use crate::Map;
use crate::common::error::PspaceError;

/// Attributes of `qstat -f1` that are expected to show up in a job record.
const KNOWN_KEYS: &[&str] = &[
    "Job_Name",
    "Job_Owner",
    "job_state",
    "queue",
    "server",
    "exec_host",
    "resources_used.cput",
    "resources_used.mem",
    "resources_used.vmem",
    "resources_used.walltime",
    "Checkpoint",
    "ctime",
    "mtime",
    "qtime",
    "etime",
    "Error_Path",
    "Hold_Types",
    "Join_Path",
    "Keep_Files",
    "Mail_Points",
    "Mail_Users",
    "Output_Path",
    "Priority",
    "Rerunable",
    "Resource_List.cput",
    "Resource_List.nodect",
    "Resource_List.nodes",
    "Resource_List.host",
    "Resource_List.mem",
    "Resource_List.walltime",
    "Resource_List.ncpus",
    "session_id",
    "submit_args",
    "start_time",
    "start_count",
    "fault_tolerant",
    "submit_host",
    "init_work_dir",
    "Walltime.Remaining",
    "x",
    "Shell_Path_List",
    "Variable_List",
    "interactive",
    "exit_status",
];

/// One job of the `qstat -f1` listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobRecord {
    pub name: String,
    /// `user@host`
    pub owner: String,
    pub state: String,
    pub queue: String,
    /// Remaining attributes.
    pub attributes: Map<String, String>,
}

impl JobRecord {
    pub fn user(&self) -> &str {
        self.owner
            .split_once('@')
            .map(|(user, _)| user)
            .unwrap_or(&self.owner)
    }

    pub fn owner_host(&self) -> Option<&str> {
        self.owner.split_once('@').map(|(_, host)| host)
    }
}

/// Jobs in the queue, keyed by their PBS job id.
pub type QueueData = Map<String, JobRecord>;

/// Parses the output of `qstat -f1`.
pub fn parse_qstat_full(output: &str) -> anyhow::Result<QueueData> {
    let mut qdata = QueueData::new();
    let mut current: Option<String> = None;

    for (index, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("Job Id:") {
            let job_id = rest.split_whitespace().last().unwrap_or_default().to_string();
            qdata.insert(job_id.clone(), JobRecord::default());
            current = Some(job_id);
            continue;
        }

        let Some(job) = current.as_ref().and_then(|id| qdata.get_mut(id)) else {
            return Err(PspaceError::BatchSystemError(format!(
                "unexpected output of \"qstat -f1\" in line {}: attribute outside of a job record",
                index + 1
            ))
            .into());
        };
        let Some((key, value)) = line.split_once('=') else {
            log::warn!(
                "Unknown output of \"qstat -f1\" in line {} \"{line}\"",
                index + 1
            );
            continue;
        };
        let (key, value) = (key.trim(), value.trim().to_string());

        match key {
            "Job_Name" => job.name = value,
            "Job_Owner" => job.owner = value,
            "job_state" => job.state = value,
            "queue" => job.queue = value,
            _ => {
                if !KNOWN_KEYS.contains(&key) {
                    log::warn!(
                        "Unknown output of \"qstat -f1\" in line {} \"{line}\"",
                        index + 1
                    );
                }
                job.attributes.insert(key.to_string(), value);
            }
        }
    }
    Ok(qdata)
}

/// One row of the short `qstat` listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleJobRecord {
    pub job_id: String,
    pub name: String,
    pub user: String,
    pub time_use: String,
    pub state: String,
    pub queue: String,
    pub job_id_num: Option<u64>,
    pub job_id_host: Option<String>,
}

/// Parses the output of a plain `qstat`.
pub fn parse_qstat_simple(output: &str) -> anyhow::Result<Vec<SimpleJobRecord>> {
    let mut records = Vec::new();
    for (index, line) in output.lines().enumerate() {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            [first, ..] if *first == "Job" || first.starts_with("--") => continue,
            [job_id, name, user, time_use, state, queue] => {
                let (job_id_num, job_id_host) = match job_id.split_once('.') {
                    Some((num, host)) => (
                        num.parse().ok(),
                        Some(host.split('.').next().unwrap_or(host).to_string()),
                    ),
                    None => (None, None),
                };
                records.push(SimpleJobRecord {
                    job_id: job_id.to_string(),
                    name: name.to_string(),
                    user: user.to_string(),
                    time_use: time_use.to_string(),
                    state: state.to_string(),
                    queue: queue.to_string(),
                    job_id_num,
                    job_id_host,
                });
            }
            _ => {
                return Err(PspaceError::BatchSystemError(format!(
                    "unexpected output of \"qstat\" in line {}: \"{line}\"",
                    index + 1
                ))
                .into());
            }
        }
    }
    Ok(records)
}
