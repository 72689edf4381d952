pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod expr;
pub mod parser;
pub mod pspace;
pub mod setup;
pub mod template;
pub mod utils;
