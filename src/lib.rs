pub mod app;
pub mod config;
pub mod engine;
pub mod report;
pub mod store;
