use std::io::IsTerminal;

use clap::{Command, CommandFactory, FromArgMatches};
use cli_table::ColorChoice;

use pspace::client::commands::completion::{COMP_WORDS, generate_completion, print_completions};
use pspace::client::commands::create::create_datafiles;
use pspace::client::commands::delete::delete_jobs;
use pspace::client::commands::info::{show_cardinality, show_info};
use pspace::client::commands::list::{list_psets, show_filenames};
use pspace::client::commands::purge::purge_datafiles;
use pspace::client::commands::submit::submit_jobs;
use pspace::client::commands::users::{list_queues, list_users};
use pspace::client::globalsettings::GlobalSettings;
use pspace::client::interrupt::Interrupt;
use pspace::client::output::cli::CliOutput;
use pspace::client::output::columns::{get_cols, printcols};
use pspace::client::output::json::JsonOutput;
use pspace::client::output::outputs::{Output, Outputs};
use pspace::client::output::quiet::Quiet;
use pspace::client::prompt::StdinPrompt;
use pspace::common::cli::{ColorPolicy, CommonOpts, RootOptions, SubCommand};
use pspace::common::setup::setup_logging;
use pspace::common::utils::fs::get_current_dir;
use pspace::pbs::PbsBatchSystem;

/// Visible commands with their aliases, e.g. `create (c)`, sorted by name.
fn command_summaries(app: &Command) -> Vec<String> {
    let mut commands: Vec<String> = app
        .get_subcommands()
        .filter(|cmd| !cmd.is_hide_set())
        .map(|cmd| {
            let aliases: Vec<&str> = cmd.get_visible_aliases().collect();
            if aliases.is_empty() {
                cmd.get_name().to_string()
            } else {
                format!("{} ({})", cmd.get_name(), aliases.join(", "))
            }
        })
        .collect();
    commands.sort();
    commands
}

fn root_command() -> Command {
    let app = RootOptions::command();
    let after_help = format!(
        "Available commands (with shortcuts):\n{}\n\nTo get help to a specific command, use \"--help\", e.g. \"pspace cardin --help\"",
        printcols(&command_summaries(&app), get_cols())
    );
    app.after_help(after_help)
}

fn make_global_settings(opts: CommonOpts, cwd: std::path::PathBuf) -> GlobalSettings {
    let color_policy = match opts.colors {
        ColorPolicy::Always => ColorChoice::AlwaysAnsi,
        ColorPolicy::Auto => {
            if std::io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
        ColorPolicy::Never => ColorChoice::Never,
    };

    let printer: Box<dyn Output> = match opts.output_mode {
        Outputs::CLI => {
            match color_policy {
                ColorChoice::Always | ColorChoice::AlwaysAnsi => {
                    colored::control::set_override(true)
                }
                ColorChoice::Never => colored::control::set_override(false),
                _ => {}
            }

            Box::new(CliOutput::new(color_policy))
        }
        Outputs::JSON => Box::<JsonOutput>::default(),
        Outputs::Quiet => Box::<Quiet>::default(),
    };

    GlobalSettings::new(
        cwd.clone(),
        printer,
        Box::new(PbsBatchSystem::new(cwd)),
        Box::new(StdinPrompt::stdin()),
        Interrupt::install(),
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> pspace::Result<()> {
    let matches = root_command().get_matches();
    let top_opts = match RootOptions::from_arg_matches(&matches) {
        Ok(opts) => opts,
        Err(error) => error.exit(),
    };

    setup_logging(top_opts.common.debug);

    if top_opts.comp_words {
        println!("{COMP_WORDS}");
        return Ok(());
    }
    let Some(subcmd) = top_opts.subcmd else {
        root_command().print_help()?;
        return Ok(());
    };

    let cwd = get_current_dir()?;
    let gsettings = make_global_settings(top_opts.common, cwd);

    let (command, result) = match subcmd {
        SubCommand::Create(opts) => ("create", create_datafiles(&gsettings, opts).await),
        SubCommand::Submit(opts) => ("submit", submit_jobs(&gsettings, opts).await),
        SubCommand::Delete(opts) => ("delete", delete_jobs(&gsettings, opts).await),
        SubCommand::Info(opts) => ("info", show_info(&gsettings, opts).await),
        SubCommand::List(opts) => ("list", list_psets(&gsettings, opts).await),
        SubCommand::Filenames(opts) => ("filenames", show_filenames(&gsettings, opts).await),
        SubCommand::Cardin(opts) => ("cardin", show_cardinality(&gsettings, opts).await),
        SubCommand::Purge(opts) => ("purge", purge_datafiles(&gsettings, opts).await),
        SubCommand::Users => ("users", list_users(&gsettings).await),
        SubCommand::Queues => ("queues", list_queues(&gsettings).await),
        SubCommand::GenerateCompletion(opts) => {
            ("generate-completion", generate_completion(opts))
        }
        SubCommand::Complete(opts) => {
            print_completions(opts, gsettings.current_dir());
            ("complete", Ok(()))
        }
    };

    if let Err(e) = result {
        gsettings.printer().print_error(e.context(command));
        std::process::exit(1);
    }

    Ok(())
}
