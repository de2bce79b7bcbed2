use folio_core::Identity;
use folio_domain::{Group, GroupName, UserRecord};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub username: String,
    pub password: String,
}

/// API representation of the caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/current-user-response.ts"
)]
pub struct CurrentUserResponse {
    pub authenticated: bool,
    #[ts(type = "number | null")]
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub groups: Vec<String>,
}

impl CurrentUserResponse {
    pub fn new(identity: Identity, user: Option<UserRecord>, groups: Vec<GroupName>) -> Self {
        Self {
            authenticated: !identity.is_anonymous(),
            user_id: identity.user_id().map(|user_id| user_id.as_i64()),
            username: user.as_ref().map(|user| user.username.clone()),
            display_name: user.map(|user| user.display_name),
            groups: groups
                .iter()
                .map(|group| group.as_str().to_owned())
                .collect(),
        }
    }
}

/// API representation of a group.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/group-response.ts"
)]
pub struct GroupResponse {
    pub name: String,
    pub description: String,
}

impl From<Group> for GroupResponse {
    fn from(value: Group) -> Self {
        Self {
            name: value.name().as_str().to_owned(),
            description: value.description().to_owned(),
        }
    }
}
