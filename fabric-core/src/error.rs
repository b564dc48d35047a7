use thiserror::Error;

/// Result type for catalog-level operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by the catalog vocabulary and its collaborators
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid value: {message}")]
    Invalid { message: String },

    #[error("Product lookup failed: {source}")]
    Lookup {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CatalogError {
    /// Create an invalid value error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Wrap a failure raised by a lookup collaborator
    pub fn lookup<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Lookup {
            source: Box::new(error),
        }
    }
}
