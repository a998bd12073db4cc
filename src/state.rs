use std::sync::Arc;

use crate::{catalog::CatalogDb, engagement::EngagementDb, storage::BlobStore};

#[derive(Debug)]
pub struct Settings {
    /// Base URL stored objects are served under; stored document URLs are
    /// prefixed with it.
    pub public_url: String,
}

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct Portal {
    pub catalog: CatalogDb,
    pub engagement: EngagementDb,
    pub blobs: BlobStore,
    pub settings: Arc<Settings>,
}

impl Portal {
    pub fn new(
        catalog: CatalogDb,
        engagement: EngagementDb,
        blobs: BlobStore,
        public_url: String,
    ) -> Self {
        Self {
            catalog,
            engagement,
            blobs,
            settings: Arc::new(Settings {
                public_url: public_url.trim_end_matches('/').to_string(),
            }),
        }
    }
}
