use crate::client::commands::users::{QueueSummary, UserSummary};
use crate::client::output::columns::Table;

#[derive(clap::ValueEnum, Clone)]
pub enum Outputs {
    CLI,
    JSON,
    Quiet,
}

pub trait Output {
    /// Report of a command, printed as `pspace: <command>: <message>`.
    fn print_message(&self, command: &str, message: &str);

    // Tables of info and list
    fn print_table(&self, table: &Table, titles: bool, width: usize);

    // Batch system
    fn print_user_summary(&self, users: &[UserSummary]);
    fn print_queue_summary(&self, queues: &[QueueSummary]);

    fn print_error(&self, error: anyhow::Error);
}
