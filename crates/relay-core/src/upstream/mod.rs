//! Upstream addressing: where a request goes and what it carries

mod endpoint;
mod headers;
mod target;

pub use endpoint::Endpoint;
pub use headers::{build_headers, ORIGIN_TYPE, ORIGIN_TYPE_HEADER, TOKEN_HEADER, USER_TYPE, USER_TYPE_HEADER};
pub use target::UpstreamTarget;
