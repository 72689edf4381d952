pub mod accuracy;
pub mod commands;
pub mod display;
pub mod globalsettings;
pub mod interrupt;
pub mod output;
pub mod prompt;
