pub mod config;
pub mod error;
pub mod fixture;
pub mod models;
pub mod report;
pub mod services;
pub mod store;
