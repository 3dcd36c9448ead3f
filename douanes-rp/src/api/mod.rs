//! HTTP API handlers for douanes-rp

pub mod brigands;
pub mod health;
pub mod organisations;
pub mod reports;
pub mod role;
pub mod villages;

pub use brigands::brigand_routes;
pub use health::health_routes;
pub use organisations::organisation_routes;
pub use reports::report_routes;
pub use role::{Agent, Role};
pub use villages::village_routes;
