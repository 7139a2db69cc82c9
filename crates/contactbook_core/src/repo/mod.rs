//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the contact storage contract.
//! - Isolate SQLite query details from the cache controller.
//!
//! # Invariants
//! - Write failures surface as `RepoError::WriteFailed`; nothing is retried.
//! - "Not found" is never an error for delete.

pub mod contact_repo;
