pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graph import failed: {message}")]
    Import { message: String },

    #[error(transparent)]
    Graph(#[from] nebula_graph::Error),

    #[error(transparent)]
    Layout(#[from] nebula_layout::Error),

    #[error("invalid pipeline config: {message}")]
    Config { message: String },

    #[error("unknown node: {key}")]
    UnknownNode { key: String },
}

impl Error {
    pub(crate) fn import(message: impl Into<String>) -> Self {
        Self::Import {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
