//! # LearnSmart Core
//!
//! Core types, errors, and utilities shared by every LearnSmart crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`file_storage`]: Pluggable storage for uploaded course material files
//! - [`pagination`]: Pagination parameters and response metadata
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Lenient deserializers for query strings
//! - [`tokens`]: Password reset token generation and hashing
//!
//! # Example
//!
//! ```ignore
//! use learnsmart_core::{AppError, hash_password, PaginationParams};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Course not found"));
//! let hash = hash_password("secure_password")?;
//! let limit = PaginationParams::default().limit();
//! ```

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod serde;
pub mod tokens;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
