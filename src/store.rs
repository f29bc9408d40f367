//! Contact store abstraction and an in-memory implementation

use crate::error::{Error, Result};
use crate::extractor::Extractor;
use crate::types::{Contact, Outcome};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Where contacts live. Implemented by the Brevo client and [`MemoryStore`].
pub trait ContactStore {
    /// Fetch a contact; `Ok(None)` when it does not exist
    fn get_contact(&self, email: &str) -> Result<Option<Contact>>;

    /// Write the first-name attribute of an existing contact
    fn update_first_name(&self, email: &str, first_name: &str) -> Result<()>;

    /// Every contact email known to the store
    fn list_emails(&self) -> Result<Vec<String>>;
}

impl<S: ContactStore + ?Sized> ContactStore for &S {
    fn get_contact(&self, email: &str) -> Result<Option<Contact>> {
        (**self).get_contact(email)
    }

    fn update_first_name(&self, email: &str, first_name: &str) -> Result<()> {
        (**self).update_first_name(email, first_name)
    }

    fn list_emails(&self) -> Result<Vec<String>> {
        (**self).list_emails()
    }
}

/// Fill in a contact's first name from its email address.
///
/// The store is written only when the contact exists, has no first name
/// (unless `force` is set) and a name could be extracted.
pub fn fill_first_name<S: ContactStore + ?Sized>(
    store: &S,
    extractor: &Extractor,
    email: &str,
    force: bool,
) -> Result<Outcome> {
    let Some(contact) = store.get_contact(email)? else {
        return Ok(Outcome::NotFound);
    };

    if !force && let Some(existing) = contact.first_name() {
        debug!(email, existing, "first name already set");
        return Ok(Outcome::AlreadySet {
            existing: existing.to_string(),
        });
    }

    let Some(name) = extractor.extract_first_name(email) else {
        return Ok(Outcome::Skipped {
            reason: "no name extracted".to_string(),
        });
    };

    store.update_first_name(email, &name)?;
    Ok(Outcome::Updated { name })
}

/// Contacts kept in memory, keyed by email.
///
/// Can be told to answer the next N requests with a rate-limit error, which
/// exercises the retry path of callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contacts: Mutex<BTreeMap<String, Contact>>,
    rate_limit_next: AtomicUsize,
    updates: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let store = Self::new();
        for contact in contacts {
            store.insert(contact);
        }
        store
    }

    pub fn insert(&self, contact: Contact) {
        self.lock().insert(contact.email.clone(), contact);
    }

    /// Fail the next `n` calls with [`Error::RateLimited`]
    pub fn rate_limit_next(&self, n: usize) {
        self.rate_limit_next.store(n, Ordering::SeqCst);
    }

    /// Number of successful first-name writes
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn contact(&self, email: &str) -> Option<Contact> {
        self.lock().get(email).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Contact>> {
        // A poisoned map is still consistent: every mutation is a single insert.
        self.contacts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_rate_limit(&self) -> Result<()> {
        let limited = self
            .rate_limit_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if limited {
            Err(Error::RateLimited)
        } else {
            Ok(())
        }
    }
}

impl ContactStore for MemoryStore {
    fn get_contact(&self, email: &str) -> Result<Option<Contact>> {
        self.check_rate_limit()?;
        Ok(self.contact(email))
    }

    fn update_first_name(&self, email: &str, first_name: &str) -> Result<()> {
        self.check_rate_limit()?;
        let mut contacts = self.lock();
        let contact = contacts.get_mut(email).ok_or_else(|| Error::Api {
            status: 404,
            message: format!("contact {email} does not exist"),
        })?;
        *contact = std::mem::take(contact).with_first_name(first_name);
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list_emails(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_counts_down() {
        let store = MemoryStore::with_contacts([Contact::new("a@b.it")]);
        store.rate_limit_next(2);

        assert!(store.get_contact("a@b.it").unwrap_err().is_rate_limited());
        assert!(store.get_contact("a@b.it").unwrap_err().is_rate_limited());
        assert!(store.get_contact("a@b.it").unwrap().is_some());
    }

    #[test]
    fn test_update_missing_contact_fails() {
        let store = MemoryStore::new();
        let err = store.update_first_name("nobody@x.it", "Mario").unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, .. }));
        assert_eq!(store.update_count(), 0);
    }

    #[test]
    fn test_fill_first_name_forced_overwrites() {
        let store = MemoryStore::with_contacts([Contact::new("mario.rossi@x.it").with_first_name("M")]);
        let extractor = Extractor::new(crate::NameRegistry::from_names(["mario"]));

        let outcome = fill_first_name(&store, &extractor, "mario.rossi@x.it", false).unwrap();
        assert_eq!(outcome, Outcome::AlreadySet { existing: "M".into() });

        let outcome = fill_first_name(&store, &extractor, "mario.rossi@x.it", true).unwrap();
        assert_eq!(outcome, Outcome::Updated { name: "Mario".into() });
        assert_eq!(store.contact("mario.rossi@x.it").unwrap().first_name(), Some("Mario"));
    }

    #[test]
    fn test_list_emails_sorted() {
        let store = MemoryStore::with_contacts([Contact::new("b@x.it"), Contact::new("a@x.it")]);
        assert_eq!(store.list_emails().unwrap(), vec!["a@x.it", "b@x.it"]);
    }
}
