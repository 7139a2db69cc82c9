//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into presentation-facing APIs.
//! - Keep UI layers decoupled from storage details.

pub mod contact_list;
