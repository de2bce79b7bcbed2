use async_trait::async_trait;
use folio_core::{AppResult, UserId};
use folio_domain::{Group, GroupName, UserRecord};

/// Repository port for stored group memberships.
#[async_trait]
pub trait GroupMembershipRepository: Send + Sync {
    /// Returns whether the user has a stored membership in the group.
    async fn is_member(&self, user_id: UserId, group: &GroupName) -> AppResult<bool>;

    /// Lists stored memberships of a user.
    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupName>>;

    /// Lists every defined group.
    async fn list_groups(&self) -> AppResult<Vec<Group>>;

    /// Adds a stored membership; existing memberships are left untouched.
    async fn add_member(&self, user_id: UserId, group: &GroupName) -> AppResult<()>;
}

/// Repository port for password accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds an account by login name.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Finds an account by id.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates the account or replaces its password hash. Returns the account id.
    async fn upsert_user(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> AppResult<UserId>;
}

/// Port for password hashing and verification.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password into a PHC string.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a PHC string.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
