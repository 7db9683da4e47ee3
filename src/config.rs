use std::env;
use thiserror::Error;

pub const EMBEDDING_MODEL: &str = "models/embedding-001";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_INDEX_NAME: &str = "knowledgeagent";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Process-wide settings, read once at startup and passed by reference
/// everywhere downstream.
#[derive(Debug, Clone)]
pub struct Settings {
    pub google_api_key: String,
    pub pinecone_api_key: String,
    pub gemini_model: String,
    pub index_name: String,
    pub data_dir: String,
    pub chunk_size: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let google_api_key =
            env::var("GOOGLE_API_KEY").map_err(|_| ConfigError::MissingVar("GOOGLE_API_KEY"))?;
        let pinecone_api_key =
            env::var("PINECONE_API_KEY").map_err(|_| ConfigError::MissingVar("PINECONE_API_KEY"))?;

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let index_name =
            env::var("PINECONE_INDEX").unwrap_or_else(|_| DEFAULT_INDEX_NAME.to_string());
        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        let chunk_size = match env::var("CHUNK_SIZE") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::InvalidVar {
                    var: "CHUNK_SIZE",
                    value: raw,
                })?,
            Err(_) => DEFAULT_CHUNK_SIZE,
        };

        Ok(Self {
            google_api_key,
            pinecone_api_key,
            gemini_model,
            index_name,
            data_dir,
            chunk_size,
        })
    }
}
