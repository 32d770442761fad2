pub mod app;
pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod history;
pub mod models;
pub mod session;
pub mod store;
pub mod ui;
pub mod utils;
