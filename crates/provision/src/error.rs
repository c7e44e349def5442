/// Error type for cluster provisioning operations.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The admin connection or a statement failed.
    #[error("cluster error: {0}")]
    Database(#[from] sqlx::Error),

    /// A name failed the identifier character check.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}
