pub mod config;
pub mod context;
pub mod error;

pub use config::BridgeConfig;
pub use context::CallContext;
pub use error::BridgeError;
