// Host-framework surface for unified CSRF prevention
// Request/response types, typed extensions, the middleware chain and logging

pub mod error;
pub mod extensions;
pub mod http;
pub mod logging;
pub mod middleware;

pub use error::*;
pub use extensions::*;
pub use http::*;
pub use middleware::*;
