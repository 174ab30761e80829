//! Common types used across Storegate

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Tenant directory records
// =============================================================================

/// A tenant record as served by the tenant directory service.
///
/// The gateway only ever reads these; the directory service owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: TenantId,
    pub name: String,
    /// Subdomain label under the platform's primary domain
    pub subdomain: String,
    /// Fully-qualified custom domain, if the tenant has one mapped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
}

// =============================================================================
// Propagation contract
// =============================================================================

/// Request header carrying the resolved tenant identifier.
pub const TENANT_IDENTIFIER_HEADER: &str = "x-tenant-identifier";

/// Request header carrying how the identifier was derived.
pub const TENANT_IDENTIFIER_TYPE_HEADER: &str = "x-tenant-identifier-type";

/// Client bootstrap cookie mirroring [`TENANT_IDENTIFIER_HEADER`].
pub const TENANT_IDENTIFIER_COOKIE: &str = "tenant_identifier";

/// Client bootstrap cookie mirroring [`TENANT_IDENTIFIER_TYPE_HEADER`].
pub const TENANT_IDENTIFIER_TYPE_COOKIE: &str = "tenant_identifier_type";

/// How a tenant identifier was derived from the request.
///
/// Downstream consumers need this to decide whether to look the tenant up
/// by subdomain index, custom-domain index, or directly by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    /// Leftmost label of a hostname under the primary domain
    Subdomain,
    /// Full hostname owned by the tenant
    CustomDomain,
    /// Merchant id taken from an admin path segment
    #[serde(rename = "merchant_id")]
    ExplicitMerchantId,
}

impl IdentifierKind {
    /// Wire value used in the propagation header and cookie.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Subdomain => "subdomain",
            IdentifierKind::CustomDomain => "custom_domain",
            IdentifierKind::ExplicitMerchantId => "merchant_id",
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdentifierKind {
    type Err = crate::error::UnknownIdentifierKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subdomain" => Ok(IdentifierKind::Subdomain),
            "custom_domain" => Ok(IdentifierKind::CustomDomain),
            "merchant_id" => Ok(IdentifierKind::ExplicitMerchantId),
            other => Err(crate::error::UnknownIdentifierKind(other.to_string())),
        }
    }
}
