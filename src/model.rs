pub mod config;
pub mod error;
pub mod listing;
pub mod path;
pub mod status;
