use clap::Parser;

use crate::Map;
use crate::client::accuracy::{get_acc, is_finished, lookup_policy};
use crate::client::commands::{conf_dirname, current_user, jobs_of_user, load_psets};
use crate::client::display::resolve_display;
use crate::client::globalsettings::GlobalSettings;
use crate::client::output::columns::{CellValue, Table, get_cols};
use crate::client::output::progress::ProgressBar;
use crate::common::cli::PsetSelectionOpts;
use crate::common::config::conf_filenames;
use crate::common::pspace::{ParameterSet, cmd_acc, cmd_exec, cmd_file};
use crate::common::template::format_g;
use crate::common::utils::fs::disk_usage_kib;
use crate::common::utils::str::one_of_in;
use crate::pbs::qstat::QueueData;

const COMMAND: &str = "list";

pub const LIST_DISPLAY: &str = "nis";
const LIST_CHARS: &str = "nieafAtpsb";
const FILTER_CHARS: &str = "fFsSrRQCEHTWP";
/// Filters that need to know the jobs in the queue.
const QUEUE_FILTERS: &str = "sSrRQCEHTWP";

fn column_title(c: char) -> &'static str {
    match c {
        'n' => "NAME",
        'i' => "ID",
        'e' => "CMD_EXEC",
        'f' => "CMD_FILE",
        'a' => "CMD_ACC",
        'A' => "ACC",
        't' => "TARGET",
        'p' => "PSET",
        's' => "STATE",
        'b' => "SIZE",
        _ => "",
    }
}

/// Options shared by `list` and `filenames`.
#[derive(Parser)]
pub struct ListViewOpts {
    #[clap(flatten)]
    pub selection: PsetSelectionOpts,

    /// Print column titles
    #[arg(short, long)]
    pub titles: bool,

    /// Width of the output, the terminal width by default
    #[arg(short, long)]
    pub columns: Option<usize>,

    /// Do not report that the user aborted the command
    #[arg(short, long)]
    pub quiet: bool,

    /// Owner of the jobs that are shown, the current user by default
    #[arg(short, long)]
    pub user: Option<String>,

    /// Show only some parameter sets
    ///
    ///  f  finished, the accuracy satisfies CMD_ACC_OP
    ///  F  unfinished
    ///  s  submitted
    ///  S  not submitted
    ///  r  to restart: unfinished and not submitted
    ///  R Q C E H T W  job in that state
    ///  P  suspended job (state "S")
    #[arg(short, long, default_value = "", verbatim_doc_comment)]
    pub filter: String,

    /// Show a progress bar while accuracies are read
    #[arg(short, long)]
    pub bar: bool,
}

/// Show one line of information per parameter set.
///
/// Characters of --display:
///  n  job name (the datafile)
///  i  job id
///  e  CMD_EXEC command
///  f  CMD_FILE command
///  a  CMD_ACC command
///  A  current accuracy
///  t  target accuracy
///  p  parameter values
///  s  job state
///  b  size of the datafile in KiB
#[derive(Parser)]
pub struct ListOpts {
    #[clap(flatten)]
    pub view: ListViewOpts,

    /// Columns to show
    #[arg(short, long, default_value = LIST_DISPLAY, allow_hyphen_values = true)]
    pub display: String,
}

#[derive(Parser)]
pub struct FilenamesOpts {
    #[clap(flatten)]
    pub view: ListViewOpts,
}

/// Job of a parameter set.
struct QueuedJob<'a> {
    id: &'a str,
    state: &'a str,
}

fn queued_jobs(qdata: &QueueData) -> Map<&str, QueuedJob<'_>> {
    let mut jobs = Map::new();
    for (job_id, job) in qdata {
        jobs.entry(job.name.as_str()).or_insert(QueuedJob {
            id: job_id.as_str(),
            state: job.state.as_str(),
        });
    }
    jobs
}

fn pset_values(pset: &ParameterSet) -> String {
    pset.values
        .iter()
        .map(|(name, value)| format!("{name}={}", format_g(value)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `finished` is `None` while the accuracy has not been read yet, the
/// accuracy filters pass in that case.
fn passes_filter(filter: &str, job: Option<&QueuedJob>, finished: Option<bool>) -> bool {
    filter.chars().all(|c| match c {
        'f' => finished.unwrap_or(true),
        'F' => finished.is_none_or(|finished| !finished),
        's' => job.is_some(),
        'S' => job.is_none(),
        'r' => job.is_none() && finished.is_none_or(|finished| !finished),
        'P' => job.is_some_and(|job| job.state == "S"),
        state => job.is_some_and(|job| job.state.len() == 1 && job.state.starts_with(state)),
    })
}

pub async fn show_filenames(gsettings: &GlobalSettings, opts: FilenamesOpts) -> anyhow::Result<()> {
    list_psets(
        gsettings,
        ListOpts {
            view: opts.view,
            display: "n".to_string(),
        },
    )
    .await
}

pub async fn list_psets(gsettings: &GlobalSettings, opts: ListOpts) -> anyhow::Result<()> {
    let display = resolve_display(&opts.display, LIST_DISPLAY, LIST_CHARS)?;
    let opts = opts.view;
    if let Some(c) = opts.filter.chars().find(|c| !FILTER_CHARS.contains(*c)) {
        anyhow::bail!("unknown character \"{c}\" in --filter");
    }
    let printer = gsettings.printer();
    let interrupt = gsettings.interrupt();
    let cwd = gsettings.current_dir();
    let width = opts.columns.unwrap_or_else(get_cols);
    let aborted = || {
        if !opts.quiet {
            printer.print_message(COMMAND, "aborted by user");
        }
    };

    let qdata = if one_of_in("is", &display) || one_of_in(QUEUE_FILTERS, &opts.filter) {
        let user = opts.user.clone().unwrap_or_else(current_user);
        let Some(qdata) = interrupt.guard(gsettings.batch().job_status()).await else {
            aborted();
            return Ok(());
        };
        jobs_of_user(qdata?, &user)
    } else {
        QueueData::new()
    };
    let jobs = queued_jobs(&qdata);
    let needs_acc = display.contains('A') || one_of_in("fFr", &opts.filter);

    for path in conf_filenames(&opts.selection.paths, cwd, false)? {
        let (conf, psets) = load_psets(&path, &opts.selection.param, cwd)?;
        let mut table = Table::new(display.chars().map(column_title).collect());
        let mut bar = ProgressBar::new(conf_dirname(&conf), psets.len(), opts.bar && needs_acc);

        for (name, pset) in &psets {
            if interrupt.is_set() {
                bar.finish();
                aborted();
                printer.print_table(&table, opts.titles, width);
                return Ok(());
            }

            let job = jobs.get(name.as_str());
            if !passes_filter(&opts.filter, job, None) {
                bar.step();
                continue;
            }

            let acc = if needs_acc {
                let Some(acc) = interrupt.guard(get_acc(&conf, pset, lookup_policy())).await else {
                    bar.finish();
                    aborted();
                    printer.print_table(&table, opts.titles, width);
                    return Ok(());
                };
                bar.step();
                acc.unwrap_or_else(|error| {
                    log::warn!("Cannot read accuracy of {name}: {error:#}");
                    None
                })
            } else {
                None
            };

            if !passes_filter(&opts.filter, job, Some(is_finished(&conf, pset, acc))) {
                continue;
            }

            let mut row = Vec::with_capacity(display.len());
            for c in display.chars() {
                row.push(match c {
                    'n' => name.as_str().into(),
                    'i' => job.map(|job| job.id).unwrap_or("").into(),
                    'e' => cmd_exec(&conf, pset)?.into(),
                    'f' => cmd_file(&conf, pset)?.into(),
                    'a' => cmd_acc(&conf, pset)?.into(),
                    'A' => acc.into(),
                    't' => CellValue::Float(pset.acc),
                    'p' => pset_values(pset).into(),
                    's' => job.map(|job| job.state).unwrap_or("").into(),
                    'b' => match disk_usage_kib(&pset.abspath) {
                        Ok(size) => CellValue::Int(size as i64),
                        Err(_) => CellValue::Empty,
                    },
                    _ => CellValue::Empty,
                });
            }
            table.rows.push(row);
        }
        bar.finish();
        printer.print_table(&table, opts.titles, width);
    }
    Ok(())
}
