//! The single currently selected object.

use crate::catalog::Catalog;
use crate::normalizer::CatalogEntry;

/// Keyed by object id so it survives catalog rebuilds. A selected id missing
/// from the current catalog is stale and resolves to nothing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    object_id: Option<String>,
}

impl Selection {
    pub fn select(&mut self, object_id: impl Into<String>) {
        self.object_id = Some(object_id.into());
    }

    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    #[must_use]
    pub fn resolve<'a>(&self, catalog: &'a Catalog) -> Option<&'a CatalogEntry> {
        self.object_id.as_deref().and_then(|id| catalog.get(id))
    }

    #[must_use]
    pub fn is_selected(&self, object_id: &str) -> bool {
        self.object_id.as_deref() == Some(object_id)
    }
}
