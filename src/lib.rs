pub mod agent;
pub mod analysis;
pub mod badge;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod message;
pub mod mutation;
pub mod normalize;
pub mod page;
pub mod taxonomy;

pub use error::{Result, ScanError};
