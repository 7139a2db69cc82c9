//! Contact domain model.
//!
//! # Responsibility
//! - Define the single record stored by the contact directory.
//! - Provide the identity rule used by delete and cache lookups.
//!
//! # Invariants
//! - `id` is supplied by the caller and never generated by the store.
//! - `0` is an ordinary id, not a "generate one" sentinel.
//! - At most one stored contact exists per `id`.

use serde::{Deserialize, Serialize};

/// Identity key of a contact.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ContactId = i64;

/// One directory entry.
///
/// `PartialEq` compares every field; use [`Contact::same_identity`] when only
/// the identity matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Caller-supplied identity key.
    pub id: ContactId,
    /// Display name.
    pub name: String,
    /// Phone number as free-form text.
    pub tel: String,
}

impl Contact {
    /// Creates a contact with a caller-provided id.
    pub fn new(id: ContactId, name: impl Into<String>, tel: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tel: tel.into(),
        }
    }

    /// Returns whether both values refer to the same stored record.
    pub fn same_identity(&self, other: &Contact) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::Contact;

    #[test]
    fn same_identity_ignores_name_and_tel() {
        let alice = Contact::new(1, "Alice", "010-1234-5678");
        let bob = Contact::new(1, "Bob", "111-2222-3333");
        let carol = Contact::new(2, "Alice", "010-1234-5678");

        assert!(alice.same_identity(&bob));
        assert_ne!(alice, bob);
        assert!(!alice.same_identity(&carol));
    }
}
