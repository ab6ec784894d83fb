//! HTTP boundary. Every auth failure becomes the same 401; see `error.rs`.

mod error;
mod handler;
mod router;
mod token;

pub use error::recover_error;
pub use router::{routes, service};
pub use token::{ACCESS_COOKIE, REFRESH_COOKIE};
