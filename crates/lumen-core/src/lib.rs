pub mod config;
pub mod error;
pub mod models;

pub use config::LumenConfig;
pub use error::LumenError;
