mod claims;
mod credential;
mod subject;
mod token;

pub use claims::*;
pub use credential::*;
pub use subject::*;
pub use token::*;
