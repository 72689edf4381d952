use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

pub type PromptFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<String>> + 'a>>;

/// Asks the user a question and returns the answer.
pub trait Prompt {
    fn ask<'a>(&'a self, question: &'a str) -> PromptFuture<'a>;
}

/// Prints the question to stdout and reads the answer line by line from `reader`.
///
/// The reader lives as long as the prompt, so input buffered while reading one
/// answer stays available for the next question. End of input answers "".
pub struct LinePrompt<R> {
    reader: Mutex<R>,
}

pub type StdinPrompt = LinePrompt<BufReader<Stdin>>;

impl<R: AsyncBufRead + Unpin> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

impl StdinPrompt {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Prompt for LinePrompt<R> {
    fn ask<'a>(&'a self, question: &'a str) -> PromptFuture<'a> {
        Box::pin(async move {
            print!("{question}");
            std::io::stdout().flush()?;
            let mut answer = String::new();
            self.reader.lock().await.read_line(&mut answer).await?;
            Ok(answer.trim().to_string())
        })
    }
}

/// Any non-empty prefix of "yes" confirms, case insensitively.
pub fn is_confirmation(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    !answer.is_empty() && "yes".starts_with(&answer)
}
