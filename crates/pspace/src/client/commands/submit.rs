use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use crate::client::accuracy::{get_acc, is_finished};
use crate::client::commands::{jobs_by_name, load_psets};
use crate::client::globalsettings::GlobalSettings;
use crate::common::cli::PsetSelectionOpts;
use crate::common::config::conf_filenames;
use crate::common::pspace::{ParameterSets, cmd_exec, count_running};
use crate::common::template::format_g;
use crate::common::utils::retry::RetryPolicy;
use crate::pbs::script::{JobScript, build_pbs_job_script};

const COMMAND: &str = "submit";

/// Pause between attempts to read the accuracy of a datafile.
const ACC_RETRY_DELAY: Duration = Duration::from_secs(2);

fn parse_delay(value: &str) -> anyhow::Result<f64> {
    let delay: f64 = value.parse().context("invalid number")?;
    if !delay.is_finite() || delay < 0.0 {
        anyhow::bail!("delay has to be a non-negative number of seconds");
    }
    Ok(delay)
}

#[derive(Parser)]
pub struct SubmitOpts {
    #[clap(flatten)]
    pub selection: PsetSelectionOpts,

    /// Number of jobs to submit, all of them by default
    #[arg(short, long)]
    pub number: Option<usize>,

    /// Send email when the job begins (b), ends (e) or aborts (a)
    #[arg(short = 'm', long, default_value = "a")]
    pub email: String,

    /// Email address for the notifications
    #[arg(short = 'M', long, env = "PSPACE_EMAIL")]
    pub email_address: Option<String>,

    /// Delay between job submissions in seconds
    #[arg(short, long, default_value_t = 0.0, value_parser = parse_delay)]
    pub delay: f64,

    /// Queue of the batch system
    #[arg(short = 'Q', long, default_value = "standard")]
    pub queue: String,

    /// Test mode, build the job scripts but do not submit them
    #[arg(short, long)]
    pub test: bool,

    /// Report skipped parameter sets
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not look up the accuracy of the datafiles
    #[arg(long)]
    pub ignore_acc: bool,

    /// Do not even report submitted jobs
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip jobs that cannot be submitted
    #[arg(short, long)]
    pub force: bool,

    /// Sort parameter sets by the value of the given parameter
    #[arg(short, long, value_name = "PARAMETER")]
    pub sort: Option<String>,

    /// Reverse the order of the parameter sets
    #[arg(short, long)]
    pub reverse: bool,
}

/// Datafile names in submission order.
fn submission_order<'a>(
    psets: &'a ParameterSets,
    sort: Option<&str>,
    reverse: bool,
) -> anyhow::Result<Vec<&'a str>> {
    let mut keys: Vec<&str> = psets.keys().map(String::as_str).collect();
    if let Some(name) = sort {
        let mut sorted = Vec::with_capacity(keys.len());
        for key in keys {
            let value = psets[key]
                .values
                .get(name)
                .with_context(|| format!("unknown parameter \"{name}\" in --sort"))?;
            sorted.push((value, key));
        }
        sorted.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        keys = sorted.into_iter().map(|(_, key)| key).collect();
    }
    if reverse {
        keys.reverse();
    }
    Ok(keys)
}

pub async fn submit_jobs(gsettings: &GlobalSettings, opts: SubmitOpts) -> anyhow::Result<()> {
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

    let mut total_count = 0;
    for path in conf_filenames(&opts.selection.paths, cwd, false)? {
        let (conf, psets) = load_psets(&path, &opts.selection.param, cwd)?;
        let keys = submission_order(&psets, opts.sort.as_deref(), opts.reverse)?;

        let Some(qdata) = interrupt.guard(gsettings.batch().job_status()).await else {
            aborted();
            return Ok(());
        };
        let qdata = qdata?;
        let queued = jobs_by_name(&qdata);
        let running = count_running(&psets, &qdata) as u64;

        let mut conf_count: u64 = 0;
        for key in keys {
            if interrupt.is_set() {
                aborted();
                return Ok(());
            }
            let pset = &psets[key];

            if let Some(maxrun) = conf.maxrun {
                if conf_count >= maxrun.saturating_sub(running) {
                    if !opts.quiet {
                        report(format!("reached MAXRUN value ({maxrun})"));
                    }
                    break;
                }
            }
            if let Some(number) = opts.number {
                if total_count >= number {
                    if verbose {
                        report(format!("reached number of jobs to submit ({number})"));
                    }
                    return Ok(());
                }
            }

            if let Some(job_id) = queued.get(key) {
                if !opts.force {
                    anyhow::bail!("cannot submit \"{key}\", already running");
                }
                if verbose {
                    report(format!("skipping \"{key}\", already running ({job_id})"));
                }
                continue;
            }
            if !pset.abspath.is_file() {
                if !opts.force {
                    anyhow::bail!("datafile \"{key}\" not found");
                }
                if verbose {
                    report(format!("skipping \"{key}\", datafile not found"));
                }
                continue;
            }

            if opts.delay > 0.0 {
                let delay = Duration::from_secs_f64(opts.delay);
                if interrupt.guard(tokio::time::sleep(delay)).await.is_none() {
                    aborted();
                    return Ok(());
                }
            }

            if !opts.ignore_acc {
                let lookup = get_acc(&conf, pset, RetryPolicy::forever(ACC_RETRY_DELAY));
                let Some(acc) = interrupt.guard(lookup).await else {
                    aborted();
                    return Ok(());
                };
                if is_finished(&conf, pset, acc?) {
                    if verbose {
                        report(format!(
                            "skipping \"{key}\", target accuracy already reached ({})",
                            format_g(pset.acc)
                        ));
                    }
                    continue;
                }
            }

            let command = cmd_exec(&conf, pset)?;
            let script = build_pbs_job_script(&JobScript {
                name: key,
                workdir: &conf.workdir,
                mail_events: Some(&opts.email),
                email: opts.email_address.as_deref(),
                queue: Some(&opts.queue),
                command: &command,
            });
            log::debug!("Job script of {key}:\n{script}");

            if opts.test {
                if !opts.quiet {
                    report(format!("would have submitted job \"{key}\""));
                }
            } else {
                let job_id = gsettings
                    .batch()
                    .submit_job(&script, &conf.workdir)
                    .await
                    .with_context(|| format!("cannot submit job \"{key}\""))?;
                if !opts.quiet {
                    report(format!("submitted job \"{key}\" ({job_id})"));
                }
            }
            conf_count += 1;
            total_count += 1;
        }
    }
    Ok(())
}
