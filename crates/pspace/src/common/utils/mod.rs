pub mod fs;
pub mod process;
pub mod retry;
pub mod str;
