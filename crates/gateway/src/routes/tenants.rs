//! Public tenant lookup endpoints
//!
//! Used by client bootstrapping code to fetch the tenant record for a
//! subdomain. Goes through the resolver, so responses are cached and
//! coalesced like the middleware's own lookups.

use axum::{
    extract::{Path, State},
    Json,
};

use storegate_shared::{IdentifierKind, TenantRecord};

use crate::error::{GatewayError, GatewayResult};
use crate::resolver::ResolveError;
use crate::state::AppState;

/// GET /api/tenants/by-subdomain/:subdomain
pub async fn by_subdomain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> GatewayResult<Json<TenantRecord>> {
    match state
        .resolver
        .resolve(&subdomain, IdentifierKind::Subdomain)
        .await
    {
        Ok(record) => Ok(Json(record)),
        Err(ResolveError::NotFound(identifier)) => {
            Err(GatewayError::UnresolvedTenant(identifier))
        }
        Err(ResolveError::Unavailable(_)) => Err(GatewayError::DirectoryUnavailable),
    }
}
