pub mod auth;
pub mod dashboard;
pub mod import;
pub mod resources;
