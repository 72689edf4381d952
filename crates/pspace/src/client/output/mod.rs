pub mod cli;
pub mod columns;
pub mod json;
pub mod outputs;
pub mod progress;
pub mod quiet;
