//! In-memory user accounts.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::UserError;

/// A stored account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

/// Accounts indexed by email and by id.
pub struct UserRepository {
    by_email: DashMap<String, User>,
    by_id: DashMap<i64, String>,
    next_id: AtomicI64,
}

impl UserRepository {
    pub fn new() -> Self {
        Self {
            by_email: DashMap::new(),
            by_id: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert a new account; emails are unique.
    pub fn create(&self, email: &str, password_hash: String) -> Result<User, UserError> {
        match self.by_email.entry(email.to_string()) {
            Entry::Occupied(_) => Err(UserError::DuplicateEmail),
            Entry::Vacant(slot) => {
                let user = User {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    email: email.to_string(),
                    password_hash,
                };
                self.by_id.insert(user.id, user.email.clone());
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.by_email.get(email).map(|r| r.value().clone())
    }

    pub fn find_by_id(&self, id: i64) -> Option<User> {
        let email = self.by_id.get(&id)?.value().clone();
        self.find_by_email(&email)
    }
}

impl Default for UserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find() {
        let repo = UserRepository::new();
        let user = repo.create("a@example.com", "hash".into()).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(repo.find_by_email("a@example.com").unwrap().id, 1);
        assert_eq!(repo.find_by_id(1).unwrap().email, "a@example.com");
        assert!(repo.find_by_id(2).is_none());
    }

    #[test]
    fn test_duplicate_email() {
        let repo = UserRepository::new();
        repo.create("a@example.com", "h1".into()).unwrap();
        assert!(matches!(
            repo.create("a@example.com", "h2".into()),
            Err(UserError::DuplicateEmail)
        ));
        assert_eq!(repo.find_by_email("a@example.com").unwrap().password_hash, "h1");
    }
}
