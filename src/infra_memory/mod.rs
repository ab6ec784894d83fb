mod credential_store_memory;
mod refresh_store_memory;
mod revocation_ledger_memory;

pub use credential_store_memory::*;
pub use refresh_store_memory::*;
pub use revocation_ledger_memory::*;
