//! # LearnSmart CLI
//!
//! Account bootstrap utilities. Self-registration never creates admins, so
//! the first admin of a fresh database is created here.
//!
//! ```ignore
//! use learnsmart_cli::accounts::create_admin;
//!
//! let id = create_admin(&pool, "Site Admin", "admin@example.com", "password123").await?;
//! ```

pub mod accounts;
