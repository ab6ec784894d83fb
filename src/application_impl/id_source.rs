use crate::domain_model::{RefreshToken, TokenId};
use nanoid::nanoid;

/// 43 symbols from nanoid's 64-letter alphabet, a little over 256 bits.
const REFRESH_TOKEN_LEN: usize = 43;

#[inline]
pub fn new_token_id() -> TokenId {
    TokenId(uuid::Uuid::new_v4().to_string())
}

#[inline]
pub fn new_refresh_token() -> RefreshToken {
    RefreshToken(nanoid!(REFRESH_TOKEN_LEN))
}
