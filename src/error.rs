pub type AerofnResult<T> = Result<T, AerofnError>;

#[derive(thiserror::Error, Debug)]
pub enum AerofnError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("property error: {0}")]
    Property(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AerofnError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn property(msg: impl Into<String>) -> Self {
        Self::Property(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}
