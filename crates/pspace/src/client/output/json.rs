use serde_json::json;

use crate::client::commands::users::{QueueSummary, UserSummary};
use crate::client::output::columns::Table;
use crate::client::output::outputs::Output;

/// Prints one JSON document per line on stdout.
#[derive(Default)]
pub struct JsonOutput;

impl JsonOutput {
    fn print(&self, data: serde_json::Value) {
        println!("{data}");
    }
}

impl Output for JsonOutput {
    fn print_message(&self, command: &str, message: &str) {
        self.print(json!({
            "command": command,
            "message": message,
        }));
    }

    fn print_table(&self, table: &Table, _titles: bool, _width: usize) {
        self.print(json!(table));
    }

    fn print_user_summary(&self, users: &[UserSummary]) {
        self.print(json!(users));
    }

    fn print_queue_summary(&self, queues: &[QueueSummary]) {
        self.print(json!(queues));
    }

    fn print_error(&self, error: anyhow::Error) {
        self.print(json!({
            "error": format!("{error:#}"),
        }));
    }
}
