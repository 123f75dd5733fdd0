use crate::config::SecurityConfig;
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::sync::Arc;
use tracing::warn;

/// Per-request Content-Security-Policy nonce.
///
/// Generated fresh for every request and handed to handlers as a request
/// extension; it never lives in shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspNonce(String);

impl CspNonce {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        CspNonce(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn insert(response: &mut Response, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            response
                .headers_mut()
                .insert(HeaderName::from_static(name), value);
        }
        Err(_) => warn!(header = name, "Skipping security header with invalid value"),
    }
}

/// Security headers middleware.
///
/// The policy comes from the immutable [`SecurityConfig`] built at startup;
/// only the CSP nonce varies per request.
pub async fn security_headers_middleware(
    State(security): State<Arc<SecurityConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let nonce = CspNonce::generate();
    req.extensions_mut().insert(nonce.clone());

    let mut res = next.run(req).await;

    insert(&mut res, "x-content-type-options", "nosniff");
    insert(&mut res, "x-frame-options", &security.frame_options);
    insert(&mut res, "referrer-policy", &security.referrer_policy);
    insert(
        &mut res,
        "content-security-policy",
        &security.content_security_policy(nonce.as_str()),
    );
    if let Some(hsts) = security.strict_transport_security() {
        insert(&mut res, "strict-transport-security", &hsts);
    }

    // API responses carry stock levels; never cache them
    if !res.headers().contains_key("cache-control") {
        insert(&mut res, "cache-control", "no-store");
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Extension, routing::get, Router};
    use tower::ServiceExt;

    async fn nonce_handler(Extension(nonce): Extension<CspNonce>) -> String {
        nonce.as_str().to_string()
    }

    fn app(security: SecurityConfig) -> Router {
        Router::new()
            .route("/", get(nonce_handler))
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(security),
                security_headers_middleware,
            ))
    }

    async fn call(app: Router) -> Response {
        app.oneshot(
            axum::http::Request::builder()
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn headers_follow_configuration() {
        let response = call(app(SecurityConfig::default())).await;
        let headers = response.headers();

        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            headers.get("strict-transport-security").unwrap(),
            "max-age=31536000; includeSubDomains"
        );
        assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    }

    #[tokio::test]
    async fn csp_carries_the_request_nonce() {
        let response = call(app(SecurityConfig::default())).await;
        let csp = response
            .headers()
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let nonce = String::from_utf8(body.to_vec()).unwrap();
        assert!(!nonce.is_empty());
        assert!(csp.contains(&format!("'nonce-{}'", nonce)));
    }

    #[tokio::test]
    async fn hsts_can_be_disabled() {
        let security = SecurityConfig {
            hsts_max_age_secs: 0,
            ..SecurityConfig::default()
        };
        let response = call(app(security)).await;
        assert!(response.headers().get("strict-transport-security").is_none());
    }

    #[test]
    fn nonces_differ_per_request() {
        assert_ne!(CspNonce::generate(), CspNonce::generate());
    }
}
