//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::links::PostgresLinkStore;
use crate::kernel::{
    BaseCaptchaVerifier, BaseSecurityScanner, BlocklistContentFilter, NoopScanner, PreviewScraper,
    RecaptchaVerifier, ServerDeps, UrlscanScanner,
};
use crate::server::middleware::admin_auth_middleware;
use crate::server::routes::{
    admin_delete_handler, admin_list_handler, admin_toggle_flag_handler, admin_update_handler,
    health_handler, public_get_handler, public_list_handler, report_handler, scan_result_handler,
    submit_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub deps: Arc<ServerDeps>,
}

/// Wire production collaborators from configuration. Anything unconfigured
/// degrades instead of failing startup: no scan key means links stay
/// `pending`, no CAPTCHA secret means every submission passes the check.
fn build_deps(pool: PgPool, config: &Config) -> Arc<ServerDeps> {
    let scanner: Arc<dyn BaseSecurityScanner> = match &config.urlscan_api_key {
        Some(key) => Arc::new(
            UrlscanScanner::new(key.clone()).expect("urlscan client construction cannot fail"),
        ),
        None => {
            tracing::warn!("URLSCAN_API_KEY not set; security scanning disabled");
            Arc::new(NoopScanner)
        }
    };

    let captcha: Option<Arc<dyn BaseCaptchaVerifier>> = match &config.recaptcha_secret {
        Some(secret) => Some(Arc::new(
            RecaptchaVerifier::new(secret.clone())
                .expect("recaptcha client construction cannot fail"),
        )),
        None => {
            tracing::warn!("RECAPTCHA_SECRET_KEY not set; CAPTCHA verification disabled");
            None
        }
    };

    Arc::new(ServerDeps::new(
        Arc::new(PostgresLinkStore::new(pool)),
        scanner,
        Arc::new(PreviewScraper::new().expect("preview scraper construction cannot fail")),
        captcha,
        Arc::new(BlocklistContentFilter::new()),
        config.admin_password.clone(),
        config.verified_user_password.clone(),
    ))
}

/// Build the Axum application router
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let deps = build_deps(pool.clone(), config);

    let app_state = AxumAppState { db_pool: pool, deps };

    // CORS configuration - the web client is served separately
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Rate limiting: 10 req/sec per IP with a burst of 20. Protects the
    // write paths from abuse without slowing down a normal browsing session.
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers() // Extract IP from X-Forwarded-For header
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    // Moderation surface: shared-credential bearer auth on every route.
    let admin_routes = Router::new()
        .route(
            "/api/admin/links",
            get(admin_list_handler)
                .patch(admin_update_handler)
                .delete(admin_delete_handler),
        )
        .route(
            "/api/admin/links/:id/toggle-flag",
            post(admin_toggle_flag_handler),
        )
        .route_layer(middleware::from_fn(admin_auth_middleware));

    Router::new()
        // Public API
        .route("/api/submit", post(submit_handler))
        .route("/api/report", post(report_handler))
        .route("/api/scan/result", post(scan_result_handler))
        .route("/api/links", get(public_list_handler))
        .route("/api/links/:id", get(public_get_handler))
        .merge(admin_routes)
        .layer(rate_limit_layer)
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
