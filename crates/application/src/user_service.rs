//! Password login and bootstrap account management.
//!
//! Login failures share one message so account names cannot be probed.

use std::sync::Arc;

use folio_core::{AppError, AppResult, Identity, UserId};
use folio_domain::{GroupName, UserRecord, validate_password};
use tracing::{info, warn};

use crate::{GroupMembershipResolver, PasswordHasher, UserRepository};

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Application service for password accounts.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    memberships: GroupMembershipResolver,
}

impl UserService {
    /// Creates the user service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        memberships: GroupMembershipResolver,
    ) -> Self {
        Self {
            users,
            password_hasher,
            memberships,
        }
    }

    /// Verifies a username and password.
    ///
    /// Unknown accounts and wrong passwords fail identically, and a hash is
    /// computed either way.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserRecord> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "password login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        Ok(user)
    }

    /// Creates or resets an account and adds it to the `admin` group.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<UserId> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation(
                "admin username must not be empty".to_owned(),
            ));
        }
        validate_password(password)?;

        let password_hash = self.password_hasher.hash_password(password)?;
        let user_id = self
            .users
            .upsert_user(username, username, &password_hash)
            .await?;
        self.memberships
            .add_member(&Identity::user(user_id), &GroupName::new("admin")?)
            .await?;

        info!(%user_id, username, "admin account ensured");
        Ok(user_id)
    }

    /// Returns the account behind an identity, if any.
    pub async fn current_user(&self, identity: &Identity) -> AppResult<Option<UserRecord>> {
        match identity.user_id() {
            Some(user_id) => self.users.find_by_id(user_id).await,
            None => Ok(None),
        }
    }

    /// Lists the identity's groups, starting with `everyone`.
    pub async fn groups_for(&self, identity: &Identity) -> AppResult<Vec<GroupName>> {
        self.memberships.groups_for(identity).await
    }
}

#[cfg(test)]
mod tests;
