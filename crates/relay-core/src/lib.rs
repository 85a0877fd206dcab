//! # relay-core
//!
//! Core functionality for batch-relay including:
//! - Per-client token resolution from a token directory
//! - Upstream endpoint and URL construction with a fixed header set
//! - The forwarder that performs the single upstream GET

pub mod error;
pub mod forwarder;
pub mod settings;
pub mod token;
pub mod upstream;

pub use error::{RelayError, Result};
pub use forwarder::{ForwardRequest, Forwarder};
pub use settings::{HttpSettings, Settings, SettingsManager, UpstreamSettings};
pub use token::{FileTokenStore, MemoryTokenStore, Token, TokenResolver};
pub use upstream::{Endpoint, UpstreamTarget};
