use crate::client::commands::users::{QueueSummary, UserSummary};
use crate::client::output::columns::{Table, render_columns};
use crate::client::output::outputs::Output;

/// Suppresses reports and prints tables without any decoration.
#[derive(Default)]
pub struct Quiet;

impl Output for Quiet {
    fn print_message(&self, _command: &str, _message: &str) {}

    fn print_table(&self, table: &Table, _titles: bool, width: usize) {
        for line in render_columns(table, false, width) {
            println!("{line}");
        }
    }

    fn print_user_summary(&self, users: &[UserSummary]) {
        for user in users {
            println!("{} {}", user.user, user.submitted);
        }
    }

    fn print_queue_summary(&self, queues: &[QueueSummary]) {
        for queue in queues {
            println!("{} {}", queue.queue, queue.submitted);
        }
    }

    fn print_error(&self, error: anyhow::Error) {
        eprintln!("pspace: {error:#}");
    }
}
