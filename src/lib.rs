pub mod aggregate;
pub mod api;
pub mod app;
pub mod breakdown;
pub mod change;
pub mod config;
pub mod datasource;
pub mod demo;
pub mod filter;
pub mod logging;
pub mod metrics;
pub mod posts;
pub mod pulse;
pub mod redis_client;
pub mod service;
pub mod types;
