//! Core types: token sessions, CSRF nonces, tracing setup.

pub mod nonce;
pub mod session;
pub mod tracing;

pub use nonce::{STATE_NONCE_LEN, nonce};
pub use session::{MemorySession, SessionStore, TokenSession};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
