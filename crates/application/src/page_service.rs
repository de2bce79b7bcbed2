use std::sync::Arc;

use folio_core::{AppError, AppResult, Identity};
use folio_domain::Page;
use tracing::debug;

use crate::{PageRepository, PermissionEvaluator};

/// Serves content pages gated by their own read groups.
#[derive(Clone)]
pub struct PageService {
    repository: Arc<dyn PageRepository>,
    permissions: PermissionEvaluator,
}

impl PageService {
    /// Creates the page service.
    #[must_use]
    pub fn new(repository: Arc<dyn PageRepository>, permissions: PermissionEvaluator) -> Self {
        Self {
            repository,
            permissions,
        }
    }

    /// Returns a page the identity may read.
    ///
    /// Unreadable pages are reported as missing so restricted slugs cannot be probed.
    pub async fn get_page(&self, identity: &Identity, slug: &str) -> AppResult<Page> {
        let Some(page) = self.repository.find_page(slug).await? else {
            return Err(page_not_found(slug));
        };

        if !self.permissions.can_read(identity, page.read_groups()).await? {
            debug!(%identity, slug, "page hidden from identity");
            return Err(page_not_found(slug));
        }

        Ok(page)
    }
}

fn page_not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("page '{slug}' does not exist"))
}
