pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("search model already registered: {0}")]
    DuplicateModel(String),

    #[error("empty constraint for field '{0}': omit fields without a value")]
    EmptyConstraint(String),
}
