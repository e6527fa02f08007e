//! # LearnSmart Auth
//!
//! JWT claim structures and token helpers.
//!
//! Two token kinds are issued at login:
//!
//! - **Access token** ([`Claims`]): short-lived, carries the user's role
//! - **Refresh token** ([`RefreshTokenClaims`]): long-lived, carries a unique `jti`
//!
//! The two claim sets are disjoint (`role` vs `jti`), so neither token
//! verifies as the other kind.

pub mod claims;
pub mod jwt;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
