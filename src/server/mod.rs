mod compactor;
mod secret;
mod server;

pub use compactor::*;
pub use secret::*;
pub use server::*;
