//! Merchant-scoped context endpoint
//!
//! Stand-in for the downstream renderer: reports the tenant identity the
//! middleware propagated and the internal path the request was served as.
//! Storefront hosts reach this through the internal rewrite; the admin host
//! reaches it with the `/store/{id}` path it already uses.

use axum::{
    extract::{Extension, Path},
    http::Uri,
    Json,
};
use serde::Serialize;

use storegate_shared::{IdentifierKind, TenantRecord};

use crate::routing::TenantContext;

#[derive(Serialize)]
pub struct StorefrontContext {
    pub tenant: String,
    pub served_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_kind: Option<IdentifierKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<TenantRecord>,
}

/// GET /store/:tenant
pub async fn context(
    Path(tenant): Path<String>,
    uri: Uri,
    context: Option<Extension<TenantContext>>,
) -> Json<StorefrontContext> {
    Json(build(tenant, uri, context))
}

/// GET /store/:tenant/*path
pub async fn context_nested(
    Path((tenant, _path)): Path<(String, String)>,
    uri: Uri,
    context: Option<Extension<TenantContext>>,
) -> Json<StorefrontContext> {
    Json(build(tenant, uri, context))
}

fn build(
    tenant: String,
    uri: Uri,
    context: Option<Extension<TenantContext>>,
) -> StorefrontContext {
    let context = context.map(|Extension(c)| c);
    StorefrontContext {
        tenant,
        served_path: uri.path().to_string(),
        identifier: context.as_ref().map(|c| c.identifier.clone()),
        identifier_kind: context.as_ref().map(|c| c.kind),
        record: context.and_then(|c| c.record),
    }
}
