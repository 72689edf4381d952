use clap::Parser;

use crate::Map;
use crate::client::accuracy::{get_acc, is_finished, lookup_policy};
use crate::client::commands::{conf_dirname, current_user, jobs_of_user};
use crate::client::display::resolve_display;
use crate::client::globalsettings::GlobalSettings;
use crate::client::output::columns::{CellValue, Table, get_cols};
use crate::client::output::progress::ProgressBar;
use crate::common::cli::PsetSelectionOpts;
use crate::common::config::{conf_filenames, parse_conf};
use crate::common::pspace::{compute_psets, filter_psets};
use crate::common::utils::fs::{disk_usage_kib, relative_path};
use crate::common::utils::str::one_of_in;
use crate::pbs::qstat::QueueData;

const COMMAND: &str = "info";

pub const INFO_DISPLAY: &str = "NcsRQ";
const INFO_CHARS: &str = "nNcefaoFMdDbsRQCEHTWSt";
/// Job states counted by the state columns.
const JOB_STATES: &str = "RQCEHTWS";

fn column_title(c: char) -> &'static str {
    match c {
        'n' => "NAME",
        'N' => "RELPATH",
        'c' => "CARDIN",
        'e' => "CMD_EXEC",
        'f' => "CMD_FILE",
        'a' => "CMD_ACC",
        'o' => "CMD_ACC_OP",
        'F' => "DATAFILE",
        'M' => "MAXRUN",
        'd' | 'D' => "WORKDIR",
        'b' => "SIZE",
        's' => "SUB",
        'R' => "R",
        'Q' => "Q",
        'C' => "C",
        'E' => "E",
        'H' => "H",
        'T' => "T",
        'W' => "W",
        'S' => "S",
        't' => "FINISHED",
        _ => "",
    }
}

/// Options shared by `info` and `cardin`.
#[derive(Parser)]
pub struct InfoViewOpts {
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

    /// Owner of the jobs that are counted, the current user by default
    #[arg(short, long)]
    pub user: Option<String>,

    /// Show a progress bar while accuracies are read (display "t")
    #[arg(short, long)]
    pub bar: bool,

    /// Fail on configuration files with errors instead of skipping them
    #[arg(short, long)]
    pub strict: bool,
}

/// Show one line of information per configuration file.
///
/// Characters of --display:
///  n  directory name of the configuration file
///  N  relative path of that directory
///  c  cardinality (number of parameter sets)
///  e  CMD_EXEC template
///  f  CMD_FILE template
///  a  CMD_ACC template
///  o  CMD_ACC_OP operator
///  F  DATAFILE template
///  M  MAXRUN
///  d  WORKDIR as written in the configuration
///  D  absolute WORKDIR
///  b  size of the directory in KiB
///  s  number of submitted jobs
///  R Q C E H T W S  number of submitted jobs in that state
///  t  number of finished parameter sets
///
/// "+db-c" adds the columns "d" and "b" to the default and removes "c".
#[derive(Parser)]
pub struct InfoOpts {
    #[clap(flatten)]
    pub view: InfoViewOpts,

    /// Columns to show
    #[arg(short, long, default_value = INFO_DISPLAY, allow_hyphen_values = true)]
    pub display: String,
}

#[derive(Parser)]
pub struct CardinOpts {
    #[clap(flatten)]
    pub view: InfoViewOpts,
}

/// Number of jobs of a configuration, in total and per state.
#[derive(Default)]
struct JobCounts {
    submitted: usize,
    states: Map<char, usize>,
}

impl JobCounts {
    fn state(&self, state: char) -> usize {
        self.states.get(&state).copied().unwrap_or(0)
    }
}

fn count_jobs(qdata: &QueueData, mut is_pset: impl FnMut(&str) -> bool) -> JobCounts {
    let mut counts = JobCounts::default();
    for job in qdata.values().filter(|job| is_pset(&job.name)) {
        counts.submitted += 1;
        let mut chars = job.state.chars();
        if let (Some(state), None) = (chars.next(), chars.next()) {
            if JOB_STATES.contains(state) {
                *counts.states.entry(state).or_default() += 1;
            }
        }
    }
    counts
}

pub async fn show_cardinality(gsettings: &GlobalSettings, opts: CardinOpts) -> anyhow::Result<()> {
    show_info(
        gsettings,
        InfoOpts {
            view: opts.view,
            display: "c".to_string(),
        },
    )
    .await
}

pub async fn show_info(gsettings: &GlobalSettings, opts: InfoOpts) -> anyhow::Result<()> {
    let display = resolve_display(&opts.display, INFO_DISPLAY, INFO_CHARS)?;
    let opts = opts.view;
    let printer = gsettings.printer();
    let interrupt = gsettings.interrupt();
    let cwd = gsettings.current_dir();
    let width = opts.columns.unwrap_or_else(get_cols);

    let qdata = if one_of_in(JOB_STATES, &display) || display.contains('s') {
        let user = opts.user.clone().unwrap_or_else(current_user);
        let Some(qdata) = interrupt.guard(gsettings.batch().job_status()).await else {
            if !opts.quiet {
                printer.print_message(COMMAND, "aborted by user");
            }
            return Ok(());
        };
        jobs_of_user(qdata?, &user)
    } else {
        QueueData::new()
    };

    let mut table = Table::new(display.chars().map(column_title).collect());
    let mut aborted = false;

    'confs: for path in conf_filenames(&opts.selection.paths, cwd, true)? {
        if interrupt.is_set() {
            aborted = true;
            break;
        }
        let conf = match parse_conf(&path) {
            Ok(conf) => conf,
            Err(error) if !opts.strict => {
                log::warn!("Skipping {}: {error}", path.display());
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        let psets = filter_psets(compute_psets(&conf, cwd)?, &opts.selection.param, &conf.pnames)?;
        let counts = count_jobs(&qdata, |name| psets.contains_key(name));

        let mut finished: usize = 0;
        if display.contains('t') {
            let mut bar = ProgressBar::new(conf_dirname(&conf), psets.len(), opts.bar);
            for pset in psets.values() {
                let Some(acc) = interrupt.guard(get_acc(&conf, pset, lookup_policy())).await else {
                    aborted = true;
                    break 'confs;
                };
                let acc = acc.unwrap_or_else(|error| {
                    log::warn!("Cannot read accuracy of {}: {error:#}", pset.file);
                    None
                });
                if is_finished(&conf, pset, acc) {
                    finished += 1;
                }
                bar.step();
            }
        }

        let row = display
            .chars()
            .map(|c| match c {
                'n' => conf_dirname(&conf).into(),
                'N' => relative_path(conf.dir(), cwd).display().to_string().into(),
                'c' => psets.len().into(),
                'e' => conf.cmd_exec.template.source().into(),
                'f' => conf.cmd_file.template.source().into(),
                'a' => conf.cmd_acc.template.source().into(),
                'o' => conf.acc_op.as_str().into(),
                'F' => conf.datafile.template.source().into(),
                'M' => conf
                    .maxrun
                    .map(|maxrun| CellValue::Int(maxrun as i64))
                    .unwrap_or(CellValue::Empty),
                'd' => conf.workdir_raw.as_deref().unwrap_or("").into(),
                'D' => conf.workdir.display().to_string().into(),
                'b' => match disk_usage_kib(conf.dir()) {
                    Ok(size) => CellValue::Int(size as i64),
                    Err(error) => {
                        log::debug!("Cannot get size of {}: {error}", conf.dir().display());
                        CellValue::Empty
                    }
                },
                's' => counts.submitted.into(),
                't' => finished.into(),
                state => counts.state(state).into(),
            })
            .collect();
        table.rows.push(row);
    }

    if aborted && !opts.quiet {
        printer.print_message(COMMAND, "aborted by user");
    }
    printer.print_table(&table, opts.titles, width);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CardinOpts, InfoOpts, show_cardinality, show_info};
    use crate::tests::utils::{EXAMPLE_CONF, SHELL_CONF, TestEnv, job};
    use clap::Parser;

    fn opts(args: &[&str]) -> InfoOpts {
        InfoOpts::parse_from(std::iter::once("info").chain(args.iter().copied()))
    }

    #[tokio::test]
    async fn test_info_default_columns() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        env.conf("heisenberg", EXAMPLE_CONF);
        env.batch
            .add_job("1.host", job("j1/l10.h5", "alice@login", "R", "standard"));
        env.batch
            .add_job("2.host", job("j2/l10.h5", "alice@login", "Q", "standard"));
        env.batch
            .add_job("3.host", job("j3/l10.h5", "bob@login", "R", "standard"));

        show_info(&env.settings(), opts(&["ising", "heisenberg", "-u", "alice", "-t"]))
            .await
            .unwrap();
        insta::assert_snapshot!(env.lines().join("\n"), @r###"
        RELPATH    CARDIN SUB R Q
        ising           3   2 1 1
        heisenberg      7   2 1 1
        "###);
    }

    #[tokio::test]
    async fn test_info_templates() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        show_info(&env.settings(), opts(&["ising", "-d", "nFMod", "-c", "200"]))
            .await
            .unwrap();
        assert_eq!(env.lines(), vec!["ising j%d/l%d 3 <= data"]);
    }

    #[tokio::test]
    async fn test_info_modified_display() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        show_info(&env.settings(), opts(&["ising", "-d", "-sRQ+n", "-u", "alice"]))
            .await
            .unwrap();
        assert_eq!(env.lines(), vec!["ising 3 ising"]);
    }

    #[tokio::test]
    async fn test_info_finished() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        for j in 1..=3 {
            env.datafile("ising", &format!("j{j}/l10.h5"), &format!("{}\n", j - 1));
        }
        show_info(&env.settings(), opts(&["ising", "-d", "ct"]))
            .await
            .unwrap();
        assert_eq!(env.lines(), vec!["3 2"]);
    }

    #[tokio::test]
    async fn test_info_skips_broken_configuration() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        env.conf("broken", "DECLARE J\nNONSENSE\n");
        show_info(&env.settings(), opts(&["broken", "missing", "ising", "-d", "nc"]))
            .await
            .unwrap();
        assert_eq!(env.lines(), vec!["ising 3"]);

        let error = show_info(&env.settings(), opts(&["broken", "-s", "-d", "c"]))
            .await
            .unwrap_err();
        assert!(error.to_string().ends_with("pspace.conf:2: syntax error"));
    }

    #[tokio::test]
    async fn test_info_unknown_display_character() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        let error = show_info(&env.settings(), opts(&["ising", "-d", "cx"]))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "unknown character \"x\" in --display");
    }

    #[tokio::test]
    async fn test_cardinality() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        let opts = CardinOpts::parse_from(["cardin", "ising", "-p", "J=2:"]);
        show_cardinality(&env.settings(), opts).await.unwrap();
        assert_eq!(env.lines(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_info_interrupted() {
        let env = TestEnv::new();
        env.conf("ising", SHELL_CONF);
        env.interrupt.trigger();
        show_info(&env.settings(), opts(&["ising", "-d", "c"]))
            .await
            .unwrap();
        assert_eq!(env.messages(), vec!["info: aborted by user"]);
        assert!(env.lines().is_empty());
    }
}
