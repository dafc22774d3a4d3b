pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod server;
pub mod store;
pub mod submission;
