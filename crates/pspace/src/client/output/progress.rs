use std::io::Write;

use crate::client::output::columns::get_cols;

const BAR_WIDTH: usize = 40;

/// Progress bar drawn on stderr while a command steps through parameter sets.
/// A disabled bar does nothing, which keeps the command loops free of checks.
pub struct ProgressBar {
    text: String,
    total: usize,
    done: usize,
    enabled: bool,
    finished: bool,
}

impl ProgressBar {
    pub fn new(text: impl Into<String>, total: usize, enabled: bool) -> Self {
        let bar = Self {
            text: text.into(),
            total,
            done: 0,
            enabled,
            finished: false,
        };
        bar.draw();
        bar
    }

    pub fn step(&mut self) {
        self.done = (self.done + 1).min(self.total);
        self.draw();
    }

    /// Ends the line of the bar. Called on drop as well.
    pub fn finish(&mut self) {
        if self.enabled && !self.finished {
            eprintln!();
        }
        self.finished = true;
    }

    fn draw(&self) {
        if !self.enabled || self.finished {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let line = render_bar(&self.text, self.done, self.total, bar_width());
        if let Err(error) = write!(stderr, "\r\x1b[2K{line}").and_then(|_| stderr.flush()) {
            log::debug!("Cannot draw progress bar: {error}");
        }
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        self.finish();
    }
}

fn bar_width() -> usize {
    BAR_WIDTH.min(get_cols() / 2)
}

pub fn render_bar(text: &str, done: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        width
    } else {
        width * done / total
    };
    format!(
        "{text} [{}{}] {done}/{total}",
        "#".repeat(filled),
        ".".repeat(width.saturating_sub(filled))
    )
}
