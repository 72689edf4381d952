use anyhow::Context;
use clap::Parser;

use crate::Map;
use crate::client::commands::load_psets;
use crate::client::globalsettings::GlobalSettings;
use crate::client::prompt::is_confirmation;
use crate::common::cli::PsetSelectionOpts;
use crate::common::config::conf_filenames;
use crate::pbs::qstat::QueueData;

const COMMAND: &str = "delete";

#[derive(Parser)]
pub struct DeleteOpts {
    #[clap(flatten)]
    pub selection: PsetSelectionOpts,

    /// Test mode, show the jobs that would have been deleted
    #[arg(short, long)]
    pub test: bool,

    /// Never prompt
    #[arg(short, long)]
    pub force: bool,

    /// Report parameter sets without a job
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not even report deleted jobs
    #[arg(short, long)]
    pub quiet: bool,

    /// Seconds between SIGTERM and SIGKILL, the time a job gets to shut down
    #[arg(short = 'W', long, default_value_t = 60)]
    pub delay: u32,

    /// Delete only running jobs (state "R")
    #[arg(short = 'R', long)]
    pub running: bool,

    /// Delete only queued jobs (state "Q")
    #[arg(short = 'Q', long)]
    pub queued: bool,
}

/// Job id and state of the deletable jobs, keyed by job name.
fn deletable_jobs<'a>(qdata: &'a QueueData, running: bool, queued: bool) -> Map<&'a str, (&'a str, &'a str)> {
    let mut jobs = Map::new();
    for (job_id, job) in qdata {
        let selected = match (running, queued) {
            (false, false) => true,
            _ => (running && job.state == "R") || (queued && job.state == "Q"),
        };
        if selected {
            jobs.insert(job.name.as_str(), (job_id.as_str(), job.state.as_str()));
        }
    }
    jobs
}

pub async fn delete_jobs(gsettings: &GlobalSettings, opts: DeleteOpts) -> anyhow::Result<()> {
    let verbose = opts.verbose && !opts.quiet;
    let printer = gsettings.printer();
    let interrupt = gsettings.interrupt();
    let cwd = gsettings.current_dir();
    let report = |message: String| printer.print_message(COMMAND, &message);
    let aborted = || {
        if !opts.quiet {
            printer.print_message(COMMAND, "aborted by user");
        }
    };

    for path in conf_filenames(&opts.selection.paths, cwd, false)? {
        let (conf, psets) = load_psets(&path, &opts.selection.param, cwd)?;
        let Some(qdata) = interrupt.guard(gsettings.batch().job_status()).await else {
            aborted();
            return Ok(());
        };
        let qdata = qdata?;
        let jobs = deletable_jobs(&qdata, opts.running, opts.queued);

        for name in psets.keys() {
            if interrupt.is_set() {
                aborted();
                return Ok(());
            }
            let Some(&(job_id, state)) = jobs.get(name.as_str()) else {
                if verbose {
                    report(format!("skipping \"{name}\", job not found"));
                }
                continue;
            };

            if opts.test {
                if !opts.quiet {
                    report(format!("would have deleted job \"{name}\" ({job_id})"));
                }
                continue;
            }

            if !opts.force {
                let question = format!("pspace: {COMMAND}: delete job \"{name}\" ({job_id}) [{state}]? ");
                let Some(answer) = interrupt.guard(gsettings.prompt().ask(&question)).await else {
                    aborted();
                    return Ok(());
                };
                if !is_confirmation(&answer?) {
                    continue;
                }
            }

            gsettings
                .batch()
                .delete_job(job_id, opts.delay, &conf.workdir)
                .await
                .with_context(|| format!("cannot delete job \"{name}\" ({job_id})"))?;
            if !opts.quiet {
                report(format!("deleted job \"{name}\" ({job_id}) [{state}]"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DeleteOpts, delete_jobs};
    use crate::tests::utils::{SHELL_CONF, TestEnv, job};
    use clap::Parser;

    fn opts(args: &[&str]) -> DeleteOpts {
        DeleteOpts::parse_from(std::iter::once("delete").chain(args.iter().copied()))
    }

    fn env() -> TestEnv {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        env.batch
            .add_job("1.host", job("j1/l10.h5", "alice@login", "R", "standard"));
        env.batch
            .add_job("2.host", job("j2/l10.h5", "alice@login", "Q", "standard"));
        env.batch
            .add_job("3.host", job("other.h5", "alice@login", "R", "standard"));
        env
    }

    #[tokio::test]
    async fn test_delete_forced() {
        let env = env();
        delete_jobs(&env.settings(), opts(&["ising", "-f", "-v", "-W", "5"]))
            .await
            .unwrap();
        assert_eq!(
            env.batch.deleted(),
            vec![("1.host".to_string(), 5), ("2.host".to_string(), 5)]
        );
        assert_eq!(
            env.messages(),
            vec![
                "delete: deleted job \"j1/l10.h5\" (1.host) [R]",
                "delete: deleted job \"j2/l10.h5\" (2.host) [Q]",
                "delete: skipping \"j3/l10.h5\", job not found",
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_prompt() {
        let env = env();
        env.answer(&["n", "Ye"]);
        delete_jobs(&env.settings(), opts(&["ising"])).await.unwrap();
        assert_eq!(
            env.prompt.questions.borrow().clone(),
            vec![
                "pspace: delete: delete job \"j1/l10.h5\" (1.host) [R]? ",
                "pspace: delete: delete job \"j2/l10.h5\" (2.host) [Q]? ",
            ]
        );
        assert_eq!(env.batch.deleted(), vec![("2.host".to_string(), 60)]);
    }

    #[tokio::test]
    async fn test_delete_only_running() {
        let env = env();
        delete_jobs(&env.settings(), opts(&["ising", "-f", "-R"]))
            .await
            .unwrap();
        assert_eq!(env.batch.deleted(), vec![("1.host".to_string(), 60)]);

        let env = self::env();
        delete_jobs(&env.settings(), opts(&["ising", "-f", "-Q"]))
            .await
            .unwrap();
        assert_eq!(env.batch.deleted(), vec![("2.host".to_string(), 60)]);
    }

    #[tokio::test]
    async fn test_delete_test_mode() {
        let env = env();
        delete_jobs(&env.settings(), opts(&["ising", "-t", "-p", "J=1"]))
            .await
            .unwrap();
        assert!(env.batch.deleted().is_empty());
        assert_eq!(
            env.messages(),
            vec!["delete: would have deleted job \"j1/l10.h5\" (1.host)"]
        );
    }

    #[tokio::test]
    async fn test_delete_latest_job_of_same_name() {
        let env = env();
        env.batch
            .add_job("4.host", job("j1/l10.h5", "alice@login", "Q", "standard"));
        delete_jobs(&env.settings(), opts(&["ising", "-f", "-p", "J=1"]))
            .await
            .unwrap();
        assert_eq!(env.batch.deleted(), vec![("4.host".to_string(), 60)]);
        assert_eq!(
            env.messages(),
            vec!["delete: deleted job \"j1/l10.h5\" (4.host) [Q]"]
        );
    }
}
