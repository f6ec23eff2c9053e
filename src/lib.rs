pub mod categorizer;
pub mod codes;
pub mod db;
pub mod error;
pub mod fmt;
pub mod models;
pub mod period;
pub mod records;
pub mod reports;
pub mod settings;
pub mod summary;
