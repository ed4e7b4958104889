pub mod audit;
pub mod commands;
pub mod domain;
pub mod error;
pub mod export;
pub mod files;
pub mod ledger;
pub mod models;
pub mod persistence;
pub mod reports;
pub mod settings;
pub mod workbook;

pub use error::AppError;
pub use ledger::Ledger;
