pub mod api;
pub mod cli;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod logging;
pub mod models;
pub mod scanner;
pub mod signals;
pub mod telegram;
pub mod utils;
pub mod validation;
pub mod whale;

pub use error::{Error, Result};
