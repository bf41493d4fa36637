//! Error types shared across all skillbridge crates.

/// Errors that can occur across the skillbridge runtime.
///
/// The audit write path deliberately has no variant that escapes to callers:
/// `StorageWrite` is produced by the store but swallowed (and logged) by the
/// audit logger before it can reach the invoking agent.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("audit storage initialization failed: {0}")]
    StorageInit(String),

    #[error("audit storage write failed: {0}")]
    StorageWrite(String),

    #[error("audit storage read failed: {0}")]
    StorageRead(String),

    #[error("invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("talent api error: {0}")]
    Api(String),
}
