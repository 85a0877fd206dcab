//! Per-client token resolution
//!
//! Tokens are provisioned out-of-band and looked up by identifier on every
//! request. Two backends are provided:
//! 1. A directory of token files
//! 2. An in-memory map (for tests and embedding)

mod types;
mod traits;
mod file;
mod memory;

pub use types::{validate_identifier, Token};
pub use traits::TokenResolver;
pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;
