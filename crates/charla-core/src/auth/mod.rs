//! Identity and credential handling: token expiry claims, the token store,
//! and local input validation.

pub mod claims;
pub mod token_store;
pub mod validate;
