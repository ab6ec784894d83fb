mod clock;
mod store_error;

pub use clock::*;
pub use store_error::*;

// store

mod credential_store;
mod refresh_store;
mod revocation_ledger;

pub use credential_store::*;
pub use refresh_store::*;
pub use revocation_ledger::*;
