use std::path::Path;

use anyhow::Context;
use clap::Parser;

use crate::client::commands::{conf_dirname, load_psets};
use crate::client::globalsettings::GlobalSettings;
use crate::client::output::progress::ProgressBar;
use crate::common::cli::PsetSelectionOpts;
use crate::common::config::conf_filenames;
use crate::common::pspace::cmd_file;
use crate::common::utils::process::run_shell_inherited;

const COMMAND: &str = "create";

/// Create datafiles, including the directories along their paths.
///
/// The datafiles are created with the CMD_FILE command of the configuration.
/// Use --force to skip existing files and just fill the gaps.
#[derive(Parser)]
pub struct CreateOpts {
    #[clap(flatten)]
    pub selection: PsetSelectionOpts,

    /// Test mode, show the datafiles that would have been created
    #[arg(short, long)]
    pub test: bool,

    /// Report skipped datafiles
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not even report created datafiles
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip existing datafiles
    #[arg(short, long)]
    pub force: bool,

    /// Show a progress bar, implies --quiet
    #[arg(short, long)]
    pub bar: bool,

    /// Recreate existing datafiles
    #[arg(short, long)]
    pub overwrite: bool,
}

pub async fn create_datafiles(gsettings: &GlobalSettings, opts: CreateOpts) -> anyhow::Result<()> {
    let quiet = opts.quiet || opts.bar;
    let verbose = opts.verbose && !quiet;
    let printer = gsettings.printer();
    let interrupt = gsettings.interrupt();
    let cwd = gsettings.current_dir();

    for path in conf_filenames(&opts.selection.paths, cwd, false)? {
        let (conf, psets) = load_psets(&path, &opts.selection.param, cwd)?;
        let mut bar = ProgressBar::new(conf_dirname(&conf), psets.len(), opts.bar);

        for (key, pset) in &psets {
            if interrupt.is_set() {
                bar.finish();
                if !quiet {
                    printer.print_message(COMMAND, "aborted by user");
                }
                return Ok(());
            }

            let datafile = &pset.abspath;
            if datafile.is_file() {
                if (opts.force && !opts.overwrite) || opts.test {
                    if verbose {
                        printer.print_message(COMMAND, &format!("skipping \"{key}\", file exists"));
                    }
                    bar.step();
                    continue;
                }
                if !opts.overwrite {
                    anyhow::bail!("cannot create file \"{key}\": File exists");
                }
            } else if datafile.exists() {
                anyhow::bail!("not a file: \"{key}\"");
            }

            if !opts.test {
                if let Some(parent) = datafile.parent() {
                    if parent.exists() && !parent.is_dir() {
                        let dirname = Path::new(key).parent().unwrap_or(Path::new(""));
                        anyhow::bail!(
                            "cannot create directory \"{}\": File exists",
                            dirname.display()
                        );
                    }
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("cannot create directory \"{}\"", parent.display())
                    })?;
                }
            }

            let command = cmd_file(&conf, pset)?;
            if opts.test {
                if !quiet {
                    printer.print_message(
                        COMMAND,
                        &format!("would have created datafile \"{key}\""),
                    );
                }
            } else {
                let Some(result) = interrupt
                    .guard(run_shell_inherited(&command, &conf.workdir))
                    .await
                else {
                    bar.finish();
                    if !quiet {
                        printer.print_message(COMMAND, "aborted by user");
                    }
                    return Ok(());
                };
                result.with_context(|| format!("cannot create datafile \"{key}\""))?;
                if !quiet {
                    printer.print_message(COMMAND, &format!("created datafile \"{key}\""));
                }
            }
            bar.step();
        }
    }
    Ok(())
}
