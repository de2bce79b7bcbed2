use std::sync::Arc;

use folio_core::{AppError, AppResult, Identity};
use folio_domain::{Group, GroupName};

use crate::GroupMembershipRepository;

/// Answers "is this identity a member of group G?".
///
/// Membership in `everyone` is synthesized here and never stored.
#[derive(Clone)]
pub struct GroupMembershipResolver {
    repository: Arc<dyn GroupMembershipRepository>,
}

impl GroupMembershipResolver {
    /// Creates a resolver backed by stored memberships.
    #[must_use]
    pub fn new(repository: Arc<dyn GroupMembershipRepository>) -> Self {
        Self { repository }
    }

    /// Returns whether the identity belongs to the group.
    ///
    /// Lookup failures are propagated; callers decide the fail-safe policy.
    pub async fn is_member(&self, identity: &Identity, group: &GroupName) -> AppResult<bool> {
        if group.is_everyone() {
            return Ok(true);
        }

        match identity {
            Identity::Anonymous => Ok(false),
            Identity::User(user_id) => self.repository.is_member(*user_id, group).await,
        }
    }

    /// Lists the identity's groups, always starting with `everyone`.
    pub async fn groups_for(&self, identity: &Identity) -> AppResult<Vec<GroupName>> {
        let mut groups = vec![GroupName::everyone()];
        if let Identity::User(user_id) = identity {
            for group in self.repository.groups_for_user(*user_id).await? {
                if !groups.contains(&group) {
                    groups.push(group);
                }
            }
        }

        Ok(groups)
    }

    /// Lists every defined group.
    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        self.repository.list_groups().await
    }

    /// Adds a stored membership.
    pub async fn add_member(&self, identity: &Identity, group: &GroupName) -> AppResult<()> {
        match identity {
            Identity::Anonymous => Err(AppError::Validation(
                "anonymous identities cannot hold stored memberships".to_owned(),
            )),
            Identity::User(user_id) => self.repository.add_member(*user_id, group).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use folio_core::{AppError, AppResult, Identity, UserId};
    use folio_domain::{Group, GroupName};

    use crate::GroupMembershipRepository;
    use crate::test_support::FakeStorage;

    use super::GroupMembershipResolver;

    struct UnavailableRepository;

    #[async_trait]
    impl GroupMembershipRepository for UnavailableRepository {
        async fn is_member(&self, _user_id: UserId, _group: &GroupName) -> AppResult<bool> {
            Err(AppError::Internal("membership lookup failed".to_owned()))
        }

        async fn groups_for_user(&self, _user_id: UserId) -> AppResult<Vec<GroupName>> {
            Err(AppError::Internal("membership lookup failed".to_owned()))
        }

        async fn list_groups(&self) -> AppResult<Vec<Group>> {
            Ok(Vec::new())
        }

        async fn add_member(&self, _user_id: UserId, _group: &GroupName) -> AppResult<()> {
            Ok(())
        }
    }

    fn group(name: &str) -> GroupName {
        GroupName::new(name).unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn everyone_needs_no_stored_membership() {
        let resolver = GroupMembershipResolver::new(Arc::new(UnavailableRepository));

        assert!(matches!(
            resolver
                .is_member(&Identity::Anonymous, &GroupName::everyone())
                .await,
            Ok(true)
        ));
        assert!(matches!(
            resolver
                .is_member(&Identity::user(UserId::new(1)), &GroupName::everyone())
                .await,
            Ok(true)
        ));
    }

    #[tokio::test]
    async fn anonymous_is_member_of_nothing_else() {
        let storage = FakeStorage::new();
        let resolver = GroupMembershipResolver::new(Arc::new(storage));

        assert!(matches!(
            resolver.is_member(&Identity::Anonymous, &group("admin")).await,
            Ok(false)
        ));
    }

    #[tokio::test]
    async fn stored_memberships_are_consulted() {
        let storage = FakeStorage::new();
        storage.grant(5, "engineer").await;
        storage.grant(5, "everyone").await;
        let resolver = GroupMembershipResolver::new(Arc::new(storage));
        let user = Identity::user(UserId::new(5));

        assert!(matches!(
            resolver.is_member(&user, &group("engineer")).await,
            Ok(true)
        ));
        assert!(matches!(
            resolver.is_member(&user, &group("admin")).await,
            Ok(false)
        ));

        let groups = resolver.groups_for(&user).await.unwrap_or_default();
        assert_eq!(groups, vec![GroupName::everyone(), group("engineer")]);
    }

    #[tokio::test]
    async fn lookup_failures_propagate() {
        let resolver = GroupMembershipResolver::new(Arc::new(UnavailableRepository));
        let user = Identity::user(UserId::new(1));

        assert!(matches!(
            resolver.is_member(&user, &group("admin")).await,
            Err(AppError::Internal(_))
        ));
        assert!(resolver.groups_for(&user).await.is_err());
    }

    #[tokio::test]
    async fn anonymous_cannot_be_granted_memberships() {
        let resolver = GroupMembershipResolver::new(Arc::new(FakeStorage::new()));

        assert!(matches!(
            resolver
                .add_member(&Identity::Anonymous, &group("admin"))
                .await,
            Err(AppError::Validation(_))
        ));
    }
}
