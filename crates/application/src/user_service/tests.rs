use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use folio_core::{AppError, AppResult, Identity, UserId};
use folio_domain::UserRecord;
use tokio::sync::Mutex;

use crate::test_support::FakeStorage;
use crate::{GroupMembershipResolver, PasswordHasher, UserRepository};

use super::UserService;

#[derive(Default)]
struct FakeUserRepository {
    users: Mutex<HashMap<String, UserRecord>>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.users.lock().await.get(username).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn upsert_user(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> AppResult<UserId> {
        let mut users = self.users.lock().await;
        let next_id = UserId::new(i64::try_from(users.len()).unwrap_or_default() + 1);
        let user = users.entry(username.to_owned()).or_insert_with(|| UserRecord {
            id: next_id,
            username: username.to_owned(),
            display_name: display_name.to_owned(),
            password_hash: String::new(),
        });
        user.password_hash = password_hash.to_owned();
        Ok(user.id)
    }
}

#[derive(Default)]
struct CountingHasher {
    hashes: std::sync::atomic::AtomicUsize,
}

impl PasswordHasher for CountingHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        self.hashes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

fn build_service() -> (UserService, Arc<CountingHasher>, FakeStorage) {
    let hasher = Arc::new(CountingHasher::default());
    let memberships = FakeStorage::new();
    let service = UserService::new(
        Arc::new(FakeUserRepository::default()),
        hasher.clone(),
        GroupMembershipResolver::new(Arc::new(memberships.clone())),
    );
    (service, hasher, memberships)
}

#[tokio::test]
async fn ensure_admin_creates_account_in_admin_group() {
    let (service, _, _) = build_service();

    let user_id = service
        .ensure_admin("root", "correct horse battery")
        .await
        .unwrap_or_else(|_| unreachable!());

    let groups = service.groups_for(&Identity::user(user_id)).await;
    assert_eq!(
        groups
            .unwrap_or_default()
            .iter()
            .map(|group| group.as_str().to_owned())
            .collect::<Vec<_>>(),
        vec!["everyone", "admin"]
    );
}

#[tokio::test]
async fn ensure_admin_rejects_short_passwords() {
    let (service, _, _) = build_service();

    let ensured = service.ensure_admin("root", "short").await;
    assert!(matches!(ensured, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn authenticate_accepts_the_right_password() {
    let (service, _, _) = build_service();
    let ensured = service.ensure_admin("root", "correct horse battery").await;
    assert!(ensured.is_ok());

    let user = service.authenticate("root", "correct horse battery").await;
    assert_eq!(user.map(|user| user.username).ok(), Some("root".to_owned()));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (service, hasher, _) = build_service();
    let ensured = service.ensure_admin("root", "correct horse battery").await;
    assert!(ensured.is_ok());
    let hashes_before = hasher.hashes.load(std::sync::atomic::Ordering::SeqCst);

    let wrong_password = service.authenticate("root", "wrong password!!").await;
    let unknown_user = service.authenticate("ghost", "wrong password!!").await;

    match (wrong_password, unknown_user) {
        (Err(AppError::Unauthorized(left)), Err(AppError::Unauthorized(right))) => {
            assert_eq!(left, right);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        hasher.hashes.load(std::sync::atomic::Ordering::SeqCst),
        hashes_before + 1
    );
}

#[tokio::test]
async fn current_user_is_none_for_anonymous() {
    let (service, _, _) = build_service();

    let current = service.current_user(&Identity::Anonymous).await;
    assert_eq!(current.ok().flatten(), None);
}
