pub mod history;
pub mod log;
