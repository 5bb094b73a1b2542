pub mod config;
pub mod logging;

pub use crate::config::{AppConfig, ListOrder};
