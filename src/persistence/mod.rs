use crate::config::{ConfigError, ReviewConfig};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<ConfigError> for PersistenceError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub fn validate_config(config: &ReviewConfig) -> PersistenceResult<()> {
    config.validate().map_err(PersistenceError::from)
}

pub mod file;

pub use file::{
    LoadedSubmissions, RejectedRow, load_config_from_json, load_submissions_from_csv,
    save_config_to_json, write_report_csv, write_reports, write_text,
};
