pub mod api;
pub mod config;
pub mod ga;
pub mod report;
pub mod server;
