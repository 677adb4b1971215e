use thiserror::Error;
use std::num::{ParseFloatError, ParseIntError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("error fetching data: HTTP status {0}")]
    FetchFailed(reqwest::StatusCode),

    #[error("invalid response from provider: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("parse int error: {0}")]
    ParseIntError(#[from] ParseIntError),

    #[error("parse float error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    #[error("warehouse error: {0}")]
    SqlError(#[from] sqlx::Error),

    #[error("load failed, transaction rolled back: {0}")]
    LoadFailed(#[source] sqlx::Error),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("data error: {0}")]
    DataError(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// 用于从字符串创建错误
impl From<String> for PipelineError {
    fn from(s: String) -> Self {
        PipelineError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for PipelineError {
    fn from(s: &str) -> Self {
        PipelineError::Unknown(s.to_string())
    }
}
