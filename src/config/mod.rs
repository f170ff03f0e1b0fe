// src/config/mod.rs
pub mod search;

pub use search::{CvConfig, HttpConfig, MailConfig, SearchConfig};
