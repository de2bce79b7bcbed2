use folio_core::{AppError, AppResult, Identity};
use folio_domain::GroupSet;
use tracing::debug;

use crate::GroupMembershipResolver;

/// Operation guarded by a group-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Guarded by `read_groups`.
    Read,
    /// Guarded by `write_groups`.
    Write,
}

impl Access {
    /// Returns a stable label for messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Decides allow/deny for an identity against a table or row group-set.
#[derive(Clone)]
pub struct PermissionEvaluator {
    resolver: GroupMembershipResolver,
}

impl PermissionEvaluator {
    /// Creates an evaluator delegating membership checks to the resolver.
    #[must_use]
    pub fn new(resolver: GroupMembershipResolver) -> Self {
        Self { resolver }
    }

    /// Returns the membership resolver.
    #[must_use]
    pub fn resolver(&self) -> &GroupMembershipResolver {
        &self.resolver
    }

    /// Returns whether the identity may read a resource guarded by `read_groups`.
    pub async fn can_read(&self, identity: &Identity, read_groups: &GroupSet) -> AppResult<bool> {
        self.allows(identity, read_groups).await
    }

    /// Returns whether the identity may write a resource guarded by `write_groups`.
    pub async fn can_write(&self, identity: &Identity, write_groups: &GroupSet) -> AppResult<bool> {
        self.allows(identity, write_groups).await
    }

    /// Fails with [`AppError::Forbidden`] unless access is allowed.
    pub async fn require(
        &self,
        identity: &Identity,
        access: Access,
        groups: &GroupSet,
        resource: &str,
    ) -> AppResult<()> {
        if self.allows(identity, groups).await? {
            return Ok(());
        }

        debug!(%identity, access = access.as_str(), resource, "access denied");
        Err(AppError::Forbidden(format!(
            "{identity} may not {} '{resource}'",
            access.as_str()
        )))
    }

    async fn allows(&self, identity: &Identity, groups: &GroupSet) -> AppResult<bool> {
        if groups.is_open() {
            return Ok(true);
        }

        for group in groups.iter() {
            if self.resolver.is_member(identity, group).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use folio_core::{AppError, AppResult, Identity, UserId};
    use folio_domain::{Group, GroupName, GroupSet};
    use proptest::prelude::*;

    use crate::{GroupMembershipRepository, GroupMembershipResolver};

    use super::{Access, PermissionEvaluator};

    struct FakeMembershipRepository {
        memberships: HashMap<i64, Vec<&'static str>>,
        unavailable: bool,
    }

    impl FakeMembershipRepository {
        fn with(memberships: HashMap<i64, Vec<&'static str>>) -> Self {
            Self {
                memberships,
                unavailable: false,
            }
        }
    }

    #[async_trait]
    impl GroupMembershipRepository for FakeMembershipRepository {
        async fn is_member(&self, user_id: UserId, group: &GroupName) -> AppResult<bool> {
            if self.unavailable {
                return Err(AppError::Internal("membership storage unavailable".to_owned()));
            }

            Ok(self
                .memberships
                .get(&user_id.as_i64())
                .is_some_and(|groups| groups.contains(&group.as_str())))
        }

        async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupName>> {
            self.memberships
                .get(&user_id.as_i64())
                .map(|groups| groups.iter().map(|name| GroupName::new(*name)).collect())
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn list_groups(&self) -> AppResult<Vec<Group>> {
            Ok(Vec::new())
        }

        async fn add_member(&self, _user_id: UserId, _group: &GroupName) -> AppResult<()> {
            Ok(())
        }
    }

    fn evaluator(repository: FakeMembershipRepository) -> PermissionEvaluator {
        PermissionEvaluator::new(GroupMembershipResolver::new(Arc::new(repository)))
    }

    fn groups(names: &[&str]) -> GroupSet {
        GroupSet::from_names(names.iter().copied()).unwrap_or_default()
    }

    fn engineer() -> Identity {
        Identity::user(UserId::new(7))
    }

    fn engineer_repository() -> FakeMembershipRepository {
        FakeMembershipRepository::with(HashMap::from([(7, vec!["engineer"])]))
    }

    #[tokio::test]
    async fn open_sets_allow_everyone() {
        let evaluator = evaluator(engineer_repository());
        let absent = GroupSet::parse(None).unwrap_or_else(|_| groups(&["admin"]));

        for identity in [Identity::Anonymous, engineer()] {
            assert!(matches!(evaluator.can_read(&identity, &GroupSet::open()).await, Ok(true)));
            assert!(matches!(evaluator.can_read(&identity, &absent).await, Ok(true)));
            assert!(matches!(evaluator.can_write(&identity, &absent).await, Ok(true)));
        }
    }

    #[tokio::test]
    async fn anonymous_is_denied_restricted_sets() {
        let evaluator = evaluator(engineer_repository());
        let result = evaluator.can_read(&Identity::Anonymous, &groups(&["admin"])).await;
        assert!(matches!(result, Ok(false)));
    }

    #[tokio::test]
    async fn any_matching_group_allows() {
        let evaluator = evaluator(engineer_repository());
        let user = engineer();

        assert!(matches!(
            evaluator.can_read(&user, &groups(&["admin", "engineer"])).await,
            Ok(true)
        ));
        assert!(matches!(evaluator.can_read(&user, &groups(&["admin"])).await, Ok(false)));
    }

    #[tokio::test]
    async fn require_reports_forbidden() {
        let evaluator = evaluator(engineer_repository());
        let result = evaluator
            .require(&engineer(), Access::Write, &groups(&["admin"]), "widgets")
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn lookup_failures_are_not_treated_as_denial() {
        let evaluator = evaluator(FakeMembershipRepository {
            memberships: HashMap::new(),
            unavailable: true,
        });

        let result = evaluator.can_read(&engineer(), &groups(&["admin"])).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let everyone = evaluator.can_read(&engineer(), &groups(&["everyone"])).await;
        assert!(matches!(everyone, Ok(true)));
    }

    #[tokio::test]
    async fn resolver_lists_everyone_first() {
        let resolver = GroupMembershipResolver::new(Arc::new(engineer_repository()));
        let listed = resolver.groups_for(&engineer()).await.unwrap_or_default();
        let names: Vec<&str> = listed.iter().map(GroupName::as_str).collect();
        assert_eq!(names, vec!["everyone", "engineer"]);

        let anonymous = resolver.groups_for(&Identity::Anonymous).await.unwrap_or_default();
        assert_eq!(anonymous.len(), 1);
    }

    proptest! {
        #[test]
        fn everyone_in_any_set_allows_any_identity(
            user in proptest::option::of(0_i64..1000),
            others in proptest::collection::vec("[a-z]{1,8}", 0..4),
            position in 0_usize..4,
        ) {
            let identity = user.map(|id| Identity::user(UserId::new(id))).unwrap_or_default();
            let mut names = others;
            let position = position.min(names.len());
            names.insert(position, "everyone".to_owned());
            let set = GroupSet::from_names(names).unwrap_or_default();

            let runtime = tokio::runtime::Builder::new_current_thread().build();
            prop_assert!(runtime.is_ok());
            let runtime = runtime.unwrap_or_else(|_| unreachable!());
            let evaluator = evaluator(FakeMembershipRepository::with(HashMap::new()));

            let (read, write) = runtime.block_on(async {
                (
                    evaluator.can_read(&identity, &set).await,
                    evaluator.can_write(&identity, &set).await,
                )
            });
            prop_assert!(matches!(read, Ok(true)));
            prop_assert!(matches!(write, Ok(true)));
        }
    }
}
