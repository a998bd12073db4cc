use serde::Deserialize;
use tracing::info;

use crate::{
    catalog::{CatalogDb, User},
    error::StashError,
};

/// Claims already verified by the external identity provider. Token
/// verification itself happens upstream; by the time a request reaches us
/// these are trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug)]
pub struct Resolved {
    pub user: User,
    pub created: bool,
}

/// Idempotent upsert-by-existence-check: a user row is created lazily on
/// first login and never updated afterwards.
pub async fn resolve(
    catalog: &CatalogDb,
    identity: &VerifiedIdentity,
) -> Result<Resolved, StashError> {
    if identity.email.trim().is_empty() || identity.name.trim().is_empty() {
        return Err(StashError::Validation("Missing user details".to_string()));
    }

    if let Some(user) = catalog.get_user_by_email(&identity.email).await? {
        return Ok(Resolved {
            user,
            created: false,
        });
    }

    let user = catalog.insert_user(&identity.email, &identity.name).await?;
    info!("New user: {}", user.email);

    Ok(Resolved {
        user,
        created: true,
    })
}
