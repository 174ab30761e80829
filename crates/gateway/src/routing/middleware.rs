//! Tenant routing middleware
//!
//! Runs on every request: classifies the Host header, derives the candidate
//! identifier, resolves it for tenant-scoped paths, rewrites the internal
//! path for storefront routes, and propagates the resolved identity through
//! request headers and response cookies. Downstream handlers never repeat
//! the resolution work.
//!
//! Deployment choices made at this boundary: a malformed Host header is
//! answered with 400 (never a guessed tenant), and a tenant-scoped path
//! with no derivable identity (bare root domain, admin shell) passes
//! through untouched.

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, HeaderName, HeaderValue, Request, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};

use storegate_shared::{IdentifierKind, TenantRecord};

use super::access::{classify_access, AccessClass};
use super::host::HostClassification;
use super::identifier::extract_identifier;
use super::rewrite::{decide, CookieSpec, RouteDecision};
use super::RequestView;
use crate::error::GatewayError;
use crate::resolver::ResolveError;
use crate::state::AppState;

/// Resolved tenant identity, attached to the request for handlers.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub identifier: String,
    pub kind: IdentifierKind,
    /// Present only when the identifier was resolved against the directory
    pub record: Option<TenantRecord>,
}

/// The edge middleware: classify, extract, resolve, rewrite, propagate.
pub async fn tenant_routing(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().host().map(str::to_string))
        .unwrap_or_default();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let classification = state.classifier.classify(&host);
    if classification == HostClassification::Malformed {
        tracing::warn!(host = %host, "Rejecting request with malformed host header");
        return GatewayError::MalformedHost.into_response();
    }

    let access = classify_access(&path);
    let view = RequestView {
        host: &host,
        path: &path,
        query: query.as_deref(),
    };
    let identifier = extract_identifier(classification, &view, state.routing());
    let decision = decide(
        classification,
        identifier,
        access,
        &path,
        state.is_production(),
    );
    tracing::debug!(
        host = %host,
        path = %path,
        classification = ?classification,
        access = ?decision.access,
        "Classified request"
    );

    // Public and auth-exempt paths skip resolution entirely; auth routes in
    // particular must stay reachable when no tenant resolves.
    let mut record = None;
    if decision.access == AccessClass::TenantScoped {
        if let Some((id, kind)) = &decision.identifier {
            match state.resolver.resolve(id, *kind).await {
                Ok(resolved) => record = Some(resolved),
                Err(ResolveError::NotFound(_)) => {
                    tracing::warn!(identifier = %id, host = %host, "No tenant for identifier");
                    return GatewayError::UnresolvedTenant(id.clone()).into_response();
                }
                Err(ResolveError::Unavailable(error)) => {
                    tracing::error!(identifier = %id, error = %error, "Tenant directory unavailable");
                    return GatewayError::DirectoryUnavailable.into_response();
                }
            }
        } else {
            tracing::debug!(host = %host, path = %path, "No tenant identity, passing through");
        }
    }

    apply_to_request(&decision, record, &mut request);
    let mut response = next.run(request).await;
    apply_cookies(&decision.cookies, &mut response);
    response
}

/// Apply the request-side half of a decision: propagation headers, tenant
/// context extension, and the internal path rewrite. The browser-visible
/// URL never changes; only the URI the inner router sees does.
fn apply_to_request(
    decision: &RouteDecision,
    record: Option<TenantRecord>,
    request: &mut Request<Body>,
) {
    for &(name, ref value) in &decision.headers {
        if let Ok(value) = HeaderValue::from_str(value) {
            // insert, not append: applying the same decision twice must
            // leave identical header state
            request
                .headers_mut()
                .insert(HeaderName::from_static(name), value);
        }
    }

    if let Some((identifier, kind)) = &decision.identifier {
        request.extensions_mut().insert(TenantContext {
            identifier: identifier.clone(),
            kind: *kind,
            record,
        });
    }

    if let Some(new_path) = &decision.rewritten_path {
        let path_and_query = match request.uri().query() {
            Some(q) => format!("{}?{}", new_path, q),
            None => new_path.clone(),
        };
        if let Ok(pq) = path_and_query.parse::<PathAndQuery>() {
            let mut parts = request.uri().clone().into_parts();
            parts.path_and_query = Some(pq);
            if let Ok(uri) = Uri::from_parts(parts) {
                *request.uri_mut() = uri;
            }
        }
    }
}

/// Apply the response-side half: bootstrap cookies. Existing cookies with
/// the same names are replaced, so reapplying a decision cannot accumulate.
fn apply_cookies(cookies: &[CookieSpec], response: &mut Response) {
    if cookies.is_empty() {
        return;
    }
    let headers = response.headers_mut();

    let kept: Vec<HeaderValue> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter(|value| {
            value
                .to_str()
                .map(|s| {
                    !cookies
                        .iter()
                        .any(|c| s.starts_with(&format!("{}=", c.name)))
                })
                .unwrap_or(true)
        })
        .cloned()
        .collect();
    headers.remove(header::SET_COOKIE);
    for value in kept {
        headers.append(header::SET_COOKIE, value);
    }

    for spec in cookies {
        let mut cookie = Cookie::new(spec.name, spec.value.clone());
        cookie.set_path("/");
        cookie.set_http_only(spec.http_only);
        cookie.set_secure(spec.secure);
        if spec.same_site_lax {
            cookie.set_same_site(SameSite::Lax);
        }
        cookie.set_max_age(time::Duration::seconds(spec.max_age_secs));
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}
