use std::path::{Path, PathBuf};

use crate::client::interrupt::Interrupt;
use crate::client::output::outputs::Output;
use crate::client::prompt::Prompt;
use crate::pbs::BatchSystem;

pub struct GlobalSettings {
    cwd: PathBuf,
    printer: Box<dyn Output>,
    batch: Box<dyn BatchSystem>,
    prompt: Box<dyn Prompt>,
    interrupt: Interrupt,
}

impl GlobalSettings {
    pub fn new(
        cwd: PathBuf,
        printer: Box<dyn Output>,
        batch: Box<dyn BatchSystem>,
        prompt: Box<dyn Prompt>,
        interrupt: Interrupt,
    ) -> Self {
        GlobalSettings {
            cwd,
            printer,
            batch,
            prompt,
            interrupt,
        }
    }

    /// Directory the command was started from. Relative paths on the command
    /// line and in the output are resolved against it.
    pub fn current_dir(&self) -> &Path {
        &self.cwd
    }

    pub fn printer(&self) -> &dyn Output {
        self.printer.as_ref()
    }

    pub fn batch(&self) -> &dyn BatchSystem {
        self.batch.as_ref()
    }

    pub fn prompt(&self) -> &dyn Prompt {
        self.prompt.as_ref()
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }
}
