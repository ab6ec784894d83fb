mod id_source;
mod jwt_signer;
mod session_manager;

pub use id_source::*;
pub use jwt_signer::*;
pub use session_manager::*;
