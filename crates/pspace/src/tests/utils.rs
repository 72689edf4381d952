use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use crate::client::commands::users::{QueueSummary, UserSummary};
use crate::client::globalsettings::GlobalSettings;
use crate::client::interrupt::Interrupt;
use crate::client::output::columns::{Table, render_columns};
use crate::client::output::outputs::Output;
use crate::client::prompt::{Prompt, PromptFuture};
use crate::pbs::qstat::{JobRecord, QueueData, SimpleJobRecord};
use crate::pbs::{BatchFuture, BatchSystem};

pub const EXAMPLE_CONF: &str = "DECLARE J, L
MAXRUN 20
WORKDIR data
DATAFILE j%d/l%d
DATAFILE_VALUES J, L
CMD_EXEC simulate -J %g -L %g -o %s -a %g
CMD_EXEC_VALUES J, L, FILE, ACC
CMD_FILE simulate --init -J %g -L %g -o %s
CMD_FILE_VALUES J, L, FILE
CMD_ACC h5acc %s
CMD_ACC_VALUES FILE
CMD_CHECKFILE h5check %s
CMD_CHECKFILE_VALUES RELPATH
PSPACE:
    PARAM J 1:4
    PARAM L 10, 20
    ACC 1%
PSPACE:
    PARAM J 3
    PARAM L 10:40:10
    ACC 1e-3
";

/// Configuration whose commands only need a POSIX shell. Datafiles contain
/// the value of `J`, which doubles as their accuracy.
pub const SHELL_CONF: &str = "DECLARE J, L
MAXRUN 3
WORKDIR data
DATAFILE j%d/l%d
DATAFILE_VALUES J, L
CMD_EXEC simulate -J %g -L %g -o %s
CMD_EXEC_VALUES J, L, FILE
CMD_FILE echo %g > %s
CMD_FILE_VALUES J, FILE
CMD_ACC cat %s
CMD_ACC_VALUES FILE
CMD_CHECKFILE cat %s
CMD_CHECKFILE_VALUES FILE
PSPACE:
    PARAM J 1:4
    PARAM L 10
    ACC 1
";

/// Writes `content` into `<dir>/pspace.conf`, creating `dir` if needed.
pub fn write_conf(dir: &Path, content: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(crate::CONF_FILENAME);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn job(name: &str, owner: &str, state: &str, queue: &str) -> JobRecord {
    JobRecord {
        name: name.to_string(),
        owner: owner.to_string(),
        state: state.to_string(),
        queue: queue.to_string(),
        ..Default::default()
    }
}

#[derive(Default)]
pub struct BatchState {
    pub qdata: QueueData,
    /// Scripts passed to `submit_job` together with their directory.
    pub submitted: Vec<(String, PathBuf)>,
    pub deleted: Vec<(String, u32)>,
    pub fail_submit: bool,
}

/// In-memory batch system. Submitted jobs do not show up in the queue.
#[derive(Clone, Default)]
pub struct FakeBatchSystem(pub Rc<RefCell<BatchState>>);

impl FakeBatchSystem {
    pub fn add_job(&self, job_id: &str, job: JobRecord) {
        self.0.borrow_mut().qdata.insert(job_id.to_string(), job);
    }

    pub fn submitted(&self) -> Vec<String> {
        self.0
            .borrow()
            .submitted
            .iter()
            .map(|(script, _)| script.clone())
            .collect()
    }

    pub fn deleted(&self) -> Vec<(String, u32)> {
        self.0.borrow().deleted.clone()
    }
}

impl BatchSystem for FakeBatchSystem {
    fn job_status(&self) -> BatchFuture<'_, QueueData> {
        let qdata = self.0.borrow().qdata.clone();
        Box::pin(async move { Ok(qdata) })
    }

    fn job_list(&self) -> BatchFuture<'_, Vec<SimpleJobRecord>> {
        let records = self
            .0
            .borrow()
            .qdata
            .iter()
            .map(|(job_id, job)| SimpleJobRecord {
                job_id: job_id.clone(),
                name: job.name.clone(),
                user: job.user().to_string(),
                time_use: "0".to_string(),
                state: job.state.clone(),
                queue: job.queue.clone(),
                job_id_num: None,
                job_id_host: None,
            })
            .collect();
        Box::pin(async move { Ok(records) })
    }

    fn submit_job<'a>(&'a self, script: &'a str, workdir: &'a Path) -> BatchFuture<'a, String> {
        Box::pin(async move {
            let mut state = self.0.borrow_mut();
            if state.fail_submit {
                anyhow::bail!("qsub failed");
            }
            state
                .submitted
                .push((script.to_string(), workdir.to_path_buf()));
            Ok(format!("{}.fake", 100 + state.submitted.len()))
        })
    }

    fn delete_job<'a>(&'a self, job_id: &'a str, delay: u32, _workdir: &'a Path) -> BatchFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.0.borrow_mut();
            state.qdata.remove(job_id);
            state.deleted.push((job_id.to_string(), delay));
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct Recorded {
    /// `<command>: <message>` lines.
    pub messages: Vec<String>,
    /// Rendered table lines.
    pub lines: Vec<String>,
    pub tables: Vec<Table>,
    pub users: Vec<UserSummary>,
    pub queues: Vec<QueueSummary>,
    pub errors: Vec<String>,
}

#[derive(Clone, Default)]
pub struct RecordingOutput(pub Rc<RefCell<Recorded>>);

impl Output for RecordingOutput {
    fn print_message(&self, command: &str, message: &str) {
        self.0
            .borrow_mut()
            .messages
            .push(format!("{command}: {message}"));
    }

    fn print_table(&self, table: &Table, titles: bool, width: usize) {
        let mut recorded = self.0.borrow_mut();
        recorded.lines.extend(render_columns(table, titles, width));
        recorded.tables.push(table.clone());
    }

    fn print_user_summary(&self, users: &[UserSummary]) {
        self.0.borrow_mut().users.extend_from_slice(users);
    }

    fn print_queue_summary(&self, queues: &[QueueSummary]) {
        self.0.borrow_mut().queues.extend_from_slice(queues);
    }

    fn print_error(&self, error: anyhow::Error) {
        self.0.borrow_mut().errors.push(format!("{error:#}"));
    }
}

/// Answers questions from a prepared list; runs out as an empty answer.
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    pub answers: Rc<RefCell<VecDeque<String>>>,
    pub questions: Rc<RefCell<Vec<String>>>,
}

impl Prompt for ScriptedPrompt {
    fn ask<'a>(&'a self, question: &'a str) -> PromptFuture<'a> {
        self.questions.borrow_mut().push(question.to_string());
        let answer = self.answers.borrow_mut().pop_front().unwrap_or_default();
        Box::pin(async move { Ok(answer) })
    }
}

/// Temporary directory with fake collaborators for command tests.
pub struct TestEnv {
    pub dir: TempDir,
    pub batch: FakeBatchSystem,
    pub output: RecordingOutput,
    pub prompt: ScriptedPrompt,
    pub interrupt: Interrupt,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            batch: Default::default(),
            output: Default::default(),
            prompt: Default::default(),
            interrupt: Default::default(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a configuration into the subdirectory `name` and returns its
    /// path as a command line argument.
    pub fn conf(&self, name: &str, content: &str) -> String {
        write_conf(&self.path().join(name), content);
        name.to_string()
    }

    pub fn settings(&self) -> GlobalSettings {
        GlobalSettings::new(
            self.path().to_path_buf(),
            Box::new(self.output.clone()),
            Box::new(self.batch.clone()),
            Box::new(self.prompt.clone()),
            self.interrupt.clone(),
        )
    }

    pub fn answer(&self, answers: &[&str]) {
        self.prompt
            .answers
            .borrow_mut()
            .extend(answers.iter().map(|answer| answer.to_string()));
    }

    pub fn messages(&self) -> Vec<String> {
        self.output.0.borrow().messages.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.output.0.borrow().lines.clone()
    }

    /// Creates a datafile of `conf` below its `WORKDIR` with `content`.
    pub fn datafile(&self, conf: &str, name: &str, content: &str) {
        let path = self.path().join(conf).join("data").join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}
