//! Signup and credential checks.

use std::sync::Arc;

use super::repository::{User, UserRepository};
use super::UserError;

/// Account operations over a [`UserRepository`].
pub struct UserService {
    repo: Arc<UserRepository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repo: Arc<UserRepository>, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<User, UserError> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        self.repo.create(email, hash)
    }

    /// Check an email/password pair. Unknown email and wrong password look the same.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, UserError> {
        let user = self.repo.find_by_email(email).ok_or(UserError::InvalidCredentials)?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        if matches {
            Ok(user)
        } else {
            Err(UserError::InvalidCredentials)
        }
    }

    pub fn profile(&self, id: i64) -> Result<User, UserError> {
        self.repo.find_by_id(id).ok_or(UserError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> UserService {
        UserService::new(Arc::new(UserRepository::new()), 4)
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let svc = service();
        let created = svc.signup("u1@example.com", "hunter22").await.unwrap();
        assert_ne!(created.password_hash, "hunter22");

        let user = svc.login("u1@example.com", "hunter22").await.unwrap();
        assert_eq!(user.id, created.id);
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let svc = service();
        svc.signup("u1@example.com", "hunter22").await.unwrap();

        assert!(matches!(
            svc.login("u1@example.com", "wrong").await,
            Err(UserError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("nobody@example.com", "hunter22").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_profile_lookup() {
        let svc = service();
        let user = svc.signup("u1@example.com", "pw").await.unwrap();
        assert_eq!(svc.profile(user.id).unwrap().email, "u1@example.com");
        assert!(matches!(svc.profile(999), Err(UserError::NotFound)));
    }
}
