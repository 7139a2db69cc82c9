//! Contact list cache controller.
//!
//! # Responsibility
//! - Hold the ordered in-memory view of the directory.
//! - Mirror every mutation to the repository before touching the view.
//! - Emit precise change events for the presentation layer.
//!
//! # Invariants
//! - The view is loaded from the repository exactly once (`initialize`).
//! - A failed repository call leaves the view and listeners untouched.
//! - `add` upserts by id in the view, so view ids stay unique like the store.

use crate::model::contact::{Contact, ContactId};
use crate::repo::contact_repo::{ContactRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Service error for contact list use-cases.
#[derive(Debug)]
pub enum ContactListError {
    /// `remove_at` index is outside `0..len`.
    IndexOutOfRange { index: usize, len: usize },
    /// A mutation was requested before `initialize`.
    NotInitialized,
    /// `initialize` was called on an already loaded list.
    AlreadyInitialized,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ContactListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "contact index {index} out of range for length {len}")
            }
            Self::NotInitialized => write!(f, "contact list is not initialized"),
            Self::AlreadyInitialized => write!(f, "contact list is already initialized"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContactListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContactListError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ContactListResult<T> = Result<T, ContactListError>;

/// Change applied to the in-memory view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactListChange {
    /// A new contact was appended at `index`.
    Inserted { index: usize, id: ContactId },
    /// The contact at `index` got new `name`/`tel` values.
    Replaced { index: usize, id: ContactId },
    /// The contact previously at `index` was removed; later entries shifted down.
    Removed { index: usize, id: ContactId },
}

type ChangeListener = Box<dyn FnMut(&ContactListChange)>;

/// Ordered in-memory contact view kept in step with a repository.
pub struct ContactList<R: ContactRepository> {
    repo: R,
    items: Vec<Contact>,
    initialized: bool,
    listeners: Vec<ChangeListener>,
}

impl<R: ContactRepository> ContactList<R> {
    /// Creates an empty, uninitialized list over the given repository.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            items: Vec::new(),
            initialized: false,
            listeners: Vec::new(),
        }
    }

    /// Creates a list and loads the current store contents into it.
    pub fn load(repo: R) -> ContactListResult<Self> {
        let mut list = Self::new(repo);
        list.initialize()?;
        Ok(list)
    }

    /// Loads every stored contact into the view, in repository order.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on a second call; the view is left as is.
    /// - `Repo` when the fetch fails; the list stays uninitialized.
    pub fn initialize(&mut self) -> ContactListResult<()> {
        if self.initialized {
            return Err(ContactListError::AlreadyInitialized);
        }

        let saved = self.repo.fetch_all()?;
        self.items.extend(saved);
        self.initialized = true;

        info!(
            "event=contact_list_init module=service status=ok count={}",
            self.items.len()
        );
        Ok(())
    }

    /// Persists `contact`, then applies it to the view.
    ///
    /// An unseen id is appended; a known id replaces the existing entry in
    /// place, matching the repository upsert.
    pub fn add(&mut self, contact: Contact) -> ContactListResult<ContactListChange> {
        self.ensure_initialized()?;

        if let Err(err) = self.repo.insert(&contact) {
            warn!(
                "event=contact_add module=service status=error id={} error={}",
                contact.id, err
            );
            return Err(err.into());
        }

        let id = contact.id;
        let change = match self.position_of(id) {
            Some(index) => {
                self.items[index] = contact;
                ContactListChange::Replaced { index, id }
            }
            None => {
                self.items.push(contact);
                ContactListChange::Inserted {
                    index: self.items.len() - 1,
                    id,
                }
            }
        };

        info!(
            "event=contact_add module=service status=ok id={} len={}",
            id,
            self.items.len()
        );
        self.notify(&change);
        Ok(change)
    }

    /// Deletes the contact at `index` from the repository, then from the view.
    ///
    /// Returns the removed contact.
    pub fn remove_at(&mut self, index: usize) -> ContactListResult<Contact> {
        self.ensure_initialized()?;

        let len = self.items.len();
        let Some(target) = self.items.get(index) else {
            return Err(ContactListError::IndexOutOfRange { index, len });
        };

        if let Err(err) = self.repo.delete(target) {
            warn!(
                "event=contact_remove module=service status=error id={} error={}",
                target.id, err
            );
            return Err(err.into());
        }

        let removed = self.items.remove(index);
        info!(
            "event=contact_remove module=service status=ok id={} len={}",
            removed.id,
            self.items.len()
        );
        self.notify(&ContactListChange::Removed {
            index,
            id: removed.id,
        });
        Ok(removed)
    }

    /// Read-only view of the current list.
    pub fn get_all(&self) -> &[Contact] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Contact> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Registers a listener called after every successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&ContactListChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Drops the view and listeners, handing the repository back.
    pub fn into_repository(self) -> R {
        self.repo
    }

    fn ensure_initialized(&self) -> ContactListResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(ContactListError::NotInitialized)
        }
    }

    fn position_of(&self, id: ContactId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn notify(&mut self, change: &ContactListChange) {
        for listener in &mut self.listeners {
            listener(change);
        }
    }
}

impl<R: ContactRepository> Debug for ContactList<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactList")
            .field("items", &self.items)
            .field("initialized", &self.initialized)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
