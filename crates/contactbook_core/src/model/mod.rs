//! Domain model for the contact directory.
//!
//! # Invariants
//! - Every contact is identified by a caller-supplied `ContactId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
