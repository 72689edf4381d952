use anyhow::Context;
use clap::Parser;

use crate::client::accuracy::{check_file, lookup_policy};
use crate::client::commands::{jobs_by_name, load_psets};
use crate::client::globalsettings::GlobalSettings;
use crate::client::prompt::is_confirmation;
use crate::common::cli::PsetSelectionOpts;
use crate::common::config::conf_filenames;
use crate::common::utils::fs::remove_empty_dirs;

const COMMAND: &str = "purge";

/// Delete datafiles without content, as reported by CMD_CHECKFILE.
///
/// Datafiles of jobs in the queue are never deleted. Directories that become
/// empty are removed as well, WORKDIR itself is kept.
#[derive(Parser)]
pub struct PurgeOpts {
    #[clap(flatten)]
    pub selection: PsetSelectionOpts,

    /// Test mode, show the datafiles that would have been deleted
    #[arg(short, long)]
    pub test: bool,

    /// Never prompt
    #[arg(short, long)]
    pub force: bool,

    /// Report skipped datafiles
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not even report deleted datafiles
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn purge_datafiles(gsettings: &GlobalSettings, opts: PurgeOpts) -> anyhow::Result<()> {
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

    let Some(qdata) = interrupt.guard(gsettings.batch().job_status()).await else {
        aborted();
        return Ok(());
    };
    let qdata = qdata?;
    let jobs = jobs_by_name(&qdata);

    for path in conf_filenames(&opts.selection.paths, cwd, false)? {
        let (conf, psets) = load_psets(&path, &opts.selection.param, cwd)?;

        for (name, pset) in &psets {
            if interrupt.is_set() {
                aborted();
                return Ok(());
            }
            if !pset.abspath.is_file() {
                continue;
            }
            if jobs.contains_key(name.as_str()) {
                if verbose {
                    report(format!("skipping \"{name}\", job in queue"));
                }
                continue;
            }

            let Some(has_content) = interrupt.guard(check_file(&conf, pset, lookup_policy())).await
            else {
                aborted();
                return Ok(());
            };
            if has_content? {
                if verbose {
                    report(format!("skipping \"{name}\", file has content"));
                }
                continue;
            }

            if opts.test {
                if !opts.quiet {
                    report(format!("would have deleted datafile \"{name}\""));
                }
                continue;
            }

            if !opts.force {
                let question = format!("pspace: {COMMAND}: delete datafile \"{name}\"? ");
                let Some(answer) = interrupt.guard(gsettings.prompt().ask(&question)).await else {
                    aborted();
                    return Ok(());
                };
                if !is_confirmation(&answer?) {
                    continue;
                }
            }

            std::fs::remove_file(&pset.abspath)
                .with_context(|| format!("cannot delete datafile \"{name}\""))?;
            if !opts.quiet {
                report(format!("deleted datafile \"{name}\""));
            }
            if let Some(parent) = pset.abspath.parent() {
                for dir in remove_empty_dirs(parent, &conf.workdir)? {
                    log::debug!("Removed empty directory {}", dir.display());
                }
            }
        }
    }
    Ok(())
}
