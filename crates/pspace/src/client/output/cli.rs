use cli_table::format::{Justify, Separator};
use cli_table::{Cell, CellStruct, ColorChoice, Style, Table, TableStruct, print_stdout};
use colored::Colorize;

use crate::client::commands::users::{QueueSummary, UserSummary};
use crate::client::output::columns::{Table as ColumnTable, render_columns};
use crate::client::output::outputs::Output;

pub struct CliOutput {
    color_policy: ColorChoice,
}

impl CliOutput {
    pub fn new(color_policy: ColorChoice) -> CliOutput {
        CliOutput { color_policy }
    }

    fn print_horizontal_table(&self, rows: Vec<Vec<CellStruct>>, header: Vec<CellStruct>) {
        let table = rows
            .table()
            .separator(
                Separator::builder()
                    .title(Some(Default::default()))
                    .column(Some(Default::default()))
                    .build(),
            )
            .title(header);
        self.print_table_struct(table);
    }

    fn print_table_struct(&self, table: TableStruct) {
        let table = table.color_choice(self.color_policy);
        if let Err(e) = print_stdout(table) {
            log::error!("Cannot print table to stdout: {:?}", e);
        }
    }
}

fn header(titles: &[&str]) -> Vec<CellStruct> {
    titles
        .iter()
        .map(|title| title.cell().bold(true))
        .collect()
}

fn count_cell(count: usize) -> CellStruct {
    count.cell().justify(Justify::Right)
}

impl Output for CliOutput {
    fn print_message(&self, command: &str, message: &str) {
        println!("pspace: {command}: {message}");
    }

    fn print_table(&self, table: &ColumnTable, titles: bool, width: usize) {
        for line in render_columns(table, titles, width) {
            println!("{line}");
        }
    }

    fn print_user_summary(&self, users: &[UserSummary]) {
        let rows = users
            .iter()
            .map(|user| {
                vec![
                    user.user.as_str().cell().bold(true),
                    user.project.as_str().cell(),
                    count_cell(user.submitted),
                    count_cell(user.running),
                    count_cell(user.queued),
                    user.queues.join(", ").cell(),
                ]
            })
            .collect();
        self.print_horizontal_table(
            rows,
            header(&["User", "Project", "Submitted", "Running", "Queued", "Queues"]),
        );
    }

    fn print_queue_summary(&self, queues: &[QueueSummary]) {
        let rows = queues
            .iter()
            .map(|queue| {
                vec![
                    queue.queue.as_str().cell().bold(true),
                    count_cell(queue.submitted),
                    count_cell(queue.running),
                    count_cell(queue.queued),
                    queue.users.join(", ").cell(),
                ]
            })
            .collect();
        self.print_horizontal_table(
            rows,
            header(&["Queue", "Submitted", "Running", "Queued", "Users"]),
        );
    }

    fn print_error(&self, error: anyhow::Error) {
        eprintln!("{} {error:#}", "pspace:".red());
    }
}
