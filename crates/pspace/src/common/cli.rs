use clap::Parser;
use clap_complete::Shell;

use crate::client::commands::completion::CompleteOpts;
use crate::client::commands::create::CreateOpts;
use crate::client::commands::delete::DeleteOpts;
use crate::client::commands::info::{CardinOpts, InfoOpts};
use crate::client::commands::list::{FilenamesOpts, ListOpts};
use crate::client::commands::purge::PurgeOpts;
use crate::client::commands::submit::SubmitOpts;
use crate::client::output::outputs::Outputs;

#[derive(clap::ValueEnum, Clone)]
pub enum ColorPolicy {
    /// Use colors if the stdout is detected to be a terminal.
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

// Common CLI options
#[derive(Parser)]
pub struct CommonOpts {
    /// Sets console color policy
    #[arg(
        long,
        default_value_t = ColorPolicy::Auto,
        value_enum,
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub colors: ColorPolicy,

    /// Sets output formatting
    #[arg(
        long,
        env = "PSPACE_OUTPUT_MODE",
        default_value_t = Outputs::CLI,
        value_enum,
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub output_mode: Outputs,

    /// Enables more detailed log output
    #[arg(
        long,
        env = "PSPACE_DEBUG",
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub debug: bool,
}

/// Manage PBS jobs for every combination of a set of parameter values
///
/// Every job command expects one or more configuration files (or directories
/// containing a "pspace.conf") as arguments.
#[derive(Parser)]
#[command(
    name = "pspace",
    author,
    version(crate::PSPACE_VERSION),
    disable_help_subcommand(true),
    help_expected(true)
)]
pub struct RootOptions {
    #[clap(flatten)]
    pub common: CommonOpts,

    /// Print the words used for shell completion of the first argument
    #[arg(long, hide = true)]
    pub comp_words: bool,

    #[clap(subcommand)]
    pub subcmd: Option<SubCommand>,
}

#[allow(clippy::large_enum_variant)]
#[derive(Parser)]
pub enum SubCommand {
    /// Create datafiles for all parameter sets
    #[command(visible_alias = "c")]
    Create(CreateOpts),
    /// Submit jobs to the batch system
    ///
    /// For every parameter set it is checked first whether a job is already
    /// working on it. Use "create" first to create missing datafiles.
    #[command(visible_alias = "s")]
    Submit(SubmitOpts),
    /// Delete jobs of the selected parameter sets from the batch system
    #[command(visible_alias = "d")]
    Delete(DeleteOpts),
    /// Show one line of information per configuration file
    #[command(visible_alias = "i")]
    Info(InfoOpts),
    /// Show one line of information per parameter set
    #[command(visible_alias = "l")]
    List(ListOpts),
    /// Show the datafile names of the selected parameter sets
    ///
    /// Shortcut for "list --display n".
    #[command(visible_alias = "f")]
    Filenames(FilenamesOpts),
    /// Show the number of parameter sets
    ///
    /// Shortcut for "info --display c".
    #[command(visible_alias = "n")]
    Cardin(CardinOpts),
    /// Delete empty datafiles and directories that end up empty
    ///
    /// Datafiles of jobs that are currently in the queue are skipped.
    #[command(visible_alias = "p")]
    Purge(PurgeOpts),
    /// List owners of submitted jobs
    #[command(visible_alias = "u")]
    Users,
    /// List queues and their usage
    #[command(visible_alias = "q")]
    Queues,
    /// Generate shell completion script
    GenerateCompletion(GenerateCompletionOpts),
    /// Print completion candidates for a word of the command line
    #[command(hide = true)]
    Complete(CompleteOpts),
}

#[derive(Parser)]
pub struct GenerateCompletionOpts {
    /// Shell flavour for which the completion script should be generated
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Options shared by all commands that work on parameter sets.
#[derive(Parser, Debug, Clone)]
pub struct PsetSelectionOpts {
    /// Configuration files or directories containing a "pspace.conf"
    #[arg(required = true, value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<String>,

    /// Select a parameter subspace, e.g. "A=1,B=:5,C=3.7:8.2"
    #[arg(short, long, default_value = "")]
    pub param: String,
}
