use folio_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::GroupSet;

/// Database-backed content page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    slug: NonEmptyString,
    title: String,
    body: String,
    read_groups: GroupSet,
}

impl Page {
    /// Creates a page projection.
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        read_groups: GroupSet,
    ) -> AppResult<Self> {
        Ok(Self {
            slug: NonEmptyString::new(slug)?,
            title: title.into(),
            body: body.into(),
            read_groups,
        })
    }

    /// Returns the URL slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns the groups allowed to view the page.
    #[must_use]
    pub fn read_groups(&self) -> &GroupSet {
        &self.read_groups
    }
}
