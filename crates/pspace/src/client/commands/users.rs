use serde::Serialize;

use crate::client::globalsettings::GlobalSettings;
use crate::pbs::qstat::QueueData;
use crate::{Map, Set};

/// Jobs of one owner across the whole batch system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub user: String,
    /// Upper-cased first component of the owner host.
    pub project: String,
    pub submitted: usize,
    pub running: usize,
    pub queued: usize,
    pub queues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSummary {
    pub queue: String,
    pub submitted: usize,
    pub running: usize,
    pub queued: usize,
    pub users: Vec<String>,
}

#[derive(Default)]
struct Counts<'a> {
    submitted: usize,
    running: usize,
    queued: usize,
    names: Set<&'a str>,
}

impl<'a> Counts<'a> {
    fn add(&mut self, state: &str, name: &'a str) {
        self.submitted += 1;
        match state {
            "R" => self.running += 1,
            "Q" => self.queued += 1,
            _ => {}
        }
        self.names.insert(name);
    }

    fn names(&self) -> Vec<String> {
        self.names.iter().map(|name| name.to_string()).collect()
    }
}

/// Summary per job owner, sorted by user name.
pub fn summarize_users(qdata: &QueueData) -> Vec<UserSummary> {
    let mut users: Map<&str, (String, Counts)> = Map::new();
    for job in qdata.values() {
        let (_, counts) = users.entry(job.user()).or_insert_with(|| {
            let project = job
                .owner_host()
                .and_then(|host| host.split('.').next())
                .unwrap_or("")
                .to_uppercase();
            (project, Counts::default())
        });
        counts.add(&job.state, &job.queue);
    }
    users
        .into_iter()
        .map(|(user, (project, counts))| UserSummary {
            user: user.to_string(),
            project,
            submitted: counts.submitted,
            running: counts.running,
            queued: counts.queued,
            queues: counts.names(),
        })
        .collect()
}

/// Summary per queue, sorted by queue name.
pub fn summarize_queues(qdata: &QueueData) -> Vec<QueueSummary> {
    let mut queues: Map<&str, Counts> = Map::new();
    for job in qdata.values() {
        queues
            .entry(job.queue.as_str())
            .or_default()
            .add(&job.state, job.user());
    }
    queues
        .into_iter()
        .map(|(queue, counts)| QueueSummary {
            queue: queue.to_string(),
            submitted: counts.submitted,
            running: counts.running,
            queued: counts.queued,
            users: counts.names(),
        })
        .collect()
}

pub async fn list_users(gsettings: &GlobalSettings) -> anyhow::Result<()> {
    let Some(qdata) = gsettings.interrupt().guard(gsettings.batch().job_status()).await else {
        gsettings.printer().print_message("users", "aborted by user");
        return Ok(());
    };
    gsettings.printer().print_user_summary(&summarize_users(&qdata?));
    Ok(())
}

pub async fn list_queues(gsettings: &GlobalSettings) -> anyhow::Result<()> {
    let Some(qdata) = gsettings.interrupt().guard(gsettings.batch().job_status()).await else {
        gsettings.printer().print_message("queues", "aborted by user");
        return Ok(());
    };
    gsettings.printer().print_queue_summary(&summarize_queues(&qdata?));
    Ok(())
}
