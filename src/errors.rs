use thiserror::Error;

pub type ConfidanteResult<T> = Result<T, ConfidanteError>;

#[derive(Debug, Error)]
pub enum ConfidanteError {
    #[error("api error: {0}")]
    Api(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),
}

impl ConfidanteError {
    pub fn api_error(msg: impl Into<String>) -> Self {
        ConfidanteError::Api(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        ConfidanteError::Config(msg.into())
    }

    pub fn validation_error(msg: impl Into<String>) -> Self {
        ConfidanteError::Validation(msg.into())
    }
}
