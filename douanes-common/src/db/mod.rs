//! Database models and queries

pub mod brigands;
pub mod init;
pub mod migrations;
pub mod models;
pub mod organisations;
pub mod reports;
pub mod villages;

pub use init::*;
pub use migrations::*;
pub use models::*;
