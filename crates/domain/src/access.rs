use std::fmt::{Display, Formatter};

use folio_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Reserved group every identity belongs to, including anonymous callers.
pub const EVERYONE_GROUP: &str = "everyone";

/// Name of a permission group, referenced by name inside group-sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(NonEmptyString);

impl GroupName {
    /// Creates a validated group name. Surrounding whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        Ok(Self(NonEmptyString::new(value.trim())?))
    }

    /// Returns the reserved `everyone` group.
    #[must_use]
    pub fn everyone() -> Self {
        Self(NonEmptyString::new(EVERYONE_GROUP).unwrap_or_else(|_| unreachable!()))
    }

    /// Returns whether this is the reserved `everyone` group.
    #[must_use]
    pub fn is_everyone(&self) -> bool {
        self.as_str() == EVERYONE_GROUP
    }

    /// Returns the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for GroupName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0.into()
    }
}

impl Display for GroupName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free set of group names guarding a table or row.
///
/// Stored as a JSON array of strings (`["admin","engineer"]`). An empty set
/// means the guarded operation is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct GroupSet(Vec<GroupName>);

impl GroupSet {
    /// Returns the unrestricted (empty) group-set.
    #[must_use]
    pub fn open() -> Self {
        Self(Vec::new())
    }

    /// Builds a group-set from names, keeping first occurrence order.
    pub fn from_names<I, S>(names: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut groups: Vec<GroupName> = Vec::new();
        for name in names {
            let group = GroupName::new(name)?;
            if !groups.contains(&group) {
                groups.push(group);
            }
        }

        Ok(Self(groups))
    }

    /// Parses the serialized storage form.
    ///
    /// `None`, blank text and `null` are absent and yield the open set. Anything
    /// that is not a JSON array of non-empty strings is a validation error; it
    /// is never downgraded to "open" or "deny all".
    pub fn parse(serialized: Option<&str>) -> AppResult<Self> {
        let Some(serialized) = serialized.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::open());
        };

        let names = serde_json::from_str::<Option<Vec<String>>>(serialized).map_err(|error| {
            AppError::Validation(format!("malformed group-set '{serialized}': {error}"))
        })?;

        Self::from_names(names.unwrap_or_default()).map_err(|error| {
            AppError::Validation(format!("malformed group-set '{serialized}': {error}"))
        })
    }

    /// Serializes to the JSON array storage form.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.names()).unwrap_or_else(|_| "[]".to_owned())
    }

    /// Serialized form for nullable storage columns; the open set is stored as `NULL`.
    #[must_use]
    pub fn to_storage(&self) -> Option<String> {
        (!self.is_open()).then(|| self.to_json())
    }

    /// Returns whether the set imposes no restriction.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether the group is listed.
    #[must_use]
    pub fn contains(&self, group: &GroupName) -> bool {
        self.0.contains(group)
    }

    /// Iterates over the listed groups in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupName> {
        self.0.iter()
    }

    /// Returns listed names in stored order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(GroupName::as_str).collect()
    }
}

impl TryFrom<Vec<String>> for GroupSet {
    type Error = AppError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_names(value)
    }
}

impl From<GroupSet> for Vec<String> {
    fn from(value: GroupSet) -> Self {
        value.0.into_iter().map(String::from).collect()
    }
}

/// Named permission bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: GroupName,
    description: String,
}

impl Group {
    /// Creates a group definition.
    #[must_use]
    pub fn new(name: GroupName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
        }
    }

    /// Returns the unique group name.
    #[must_use]
    pub fn name(&self) -> &GroupName {
        &self.name
    }

    /// Returns the free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}
