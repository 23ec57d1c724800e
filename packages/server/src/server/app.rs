//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use twilio::{TwilioOptions, TwilioService};

use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::domains::orphanages::MAX_DOCUMENT_SIZE;
use crate::kernel::{
    AnalyticsOptions, BaseEmailService, BaseObjectStorage, BaseSmsService, EmailClient,
    HttpObjectStorage, OpenAIAdapter, ServerDeps, StreamHub, TwilioAdapter, Unconfigured,
};
use crate::server::middleware::{extract_client_ip, jwt_auth_middleware};
use crate::server::routes::*;

/// Room for multipart boundaries and the text fields around the file
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

impl AppState {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            deps: Arc::new(deps),
        }
    }
}

/// Wire the production services from configuration.
///
/// Providers without credentials are replaced by `Unconfigured`, whose calls fail
/// and are reported per request instead of preventing startup.
pub fn build_deps(config: &Config, pool: PgPool) -> ServerDeps {
    let ai = Arc::new(OpenAIAdapter::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));

    let email: Arc<dyn BaseEmailService> = match &config.email_api_key {
        Some(key) => Arc::new(EmailClient::new(key.clone(), config.email_from.clone())),
        None => {
            tracing::warn!("EMAIL_API_KEY not set, e-mail delivery disabled");
            Arc::new(Unconfigured("E-mail provider"))
        }
    };

    let sms: Arc<dyn BaseSmsService> = match (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_from_number,
    ) {
        (Some(account_sid), Some(auth_token), Some(from)) => {
            let twilio = TwilioService::new(TwilioOptions {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
                from: from.clone(),
            });
            Arc::new(TwilioAdapter::new(Arc::new(twilio)))
        }
        _ => {
            tracing::warn!("Twilio credentials incomplete, SMS delivery disabled");
            Arc::new(Unconfigured("Twilio"))
        }
    };

    let storage: Arc<dyn BaseObjectStorage> =
        match (&config.storage_url, &config.storage_service_key) {
            (Some(url), Some(key)) => Arc::new(HttpObjectStorage::new(
                url.clone(),
                key.clone(),
                config.storage_bucket.clone(),
            )),
            _ => {
                tracing::warn!("Object storage not configured, document uploads will fail");
                Arc::new(Unconfigured("Object storage"))
            }
        };

    let jwt_service = match &config.jwt_secret {
        Some(secret) => JwtService::new(secret),
        None => JwtService::unverified(),
    };

    let mut analytics = AnalyticsOptions::default();
    if !config.analytics_models.is_empty() {
        analytics.models = config.analytics_models.clone();
    }

    ServerDeps::new(
        pool,
        ai,
        email,
        sms,
        storage,
        StreamHub::new(),
        Arc::new(jwt_service),
        analytics,
    )
}

/// Routes, JWT decoding and shared state. No socket-dependent layers, so tests can
/// drive it with `oneshot`.
pub fn build_router(state: AppState) -> Router {
    let jwt_service = state.deps.jwt_service.clone();

    let api = Router::new()
        // Care centers
        .route(
            "/orphanages",
            get(list_orphanages_handler).post(create_orphanage_handler),
        )
        .route(
            "/orphanages/:id",
            get(get_orphanage_handler)
                .put(update_orphanage_handler)
                .patch(update_orphanage_handler)
                .delete(delete_orphanage_handler),
        )
        .route(
            "/orphanages/:id/legal-status",
            patch(update_legal_status_handler),
        )
        .route(
            "/orphanages/:id/documents",
            post(upload_document_handler)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_SIZE + MULTIPART_OVERHEAD)),
        )
        .route(
            "/orphanages/:id/documents/:document_id",
            delete(delete_document_handler),
        )
        // Children
        .route(
            "/children",
            get(list_children_handler).post(add_child_handler),
        )
        .route(
            "/children/:id",
            get(get_child_handler)
                .put(update_child_handler)
                .patch(update_child_handler)
                .delete(delete_child_handler),
        )
        // Health
        .route(
            "/health-records",
            get(list_health_records_handler).post(create_health_record_handler),
        )
        .route(
            "/health-records/:id",
            delete(delete_health_record_handler),
        )
        .route("/diseases", get(list_diseases_handler))
        // Nutrition
        .route(
            "/nutrition-records",
            get(list_nutrition_records_handler).post(create_nutrition_record_handler),
        )
        .route(
            "/nutrition-records/:id",
            put(update_nutrition_record_handler)
                .patch(update_nutrition_record_handler)
                .delete(delete_nutrition_record_handler),
        )
        // Notifications and messaging
        .route("/notifications", get(list_notifications_handler))
        .route("/notifications/stream", get(notification_stream_handler))
        .route("/notifications/read-all", post(mark_all_read_handler))
        .route("/notifications/:id/read", post(mark_read_handler))
        .route("/notifications/send", post(send_notification_handler))
        // Partners
        .route(
            "/partner-requests",
            get(list_partner_requests_handler).post(submit_partner_request_handler),
        )
        .route(
            "/partner-requests/:id/status",
            patch(review_partner_request_handler),
        )
        // Monitoring
        .route("/analytics/ask", post(ask_handler))
        .route("/dashboard/stats", get(dashboard_stats_handler))
        .route("/alerts/run", post(run_alerts_handler));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
}

/// Full production application: router plus rate limiting, CORS and request tracing.
///
/// Must be served with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_app(config: &Config, pool: PgPool) -> Result<(Router, Arc<ServerDeps>)> {
    let state = AppState::new(build_deps(config, pool));
    let deps = state.deps.clone();

    let origins = if config.allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("ALLOWED_ORIGINS contains an invalid origin")?;
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // 10 requests per second per peer IP, bursts of 30; x-ratelimit-* headers on responses
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(30)
            .use_headers()
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let app = build_router(state)
        .layer(rate_limit_layer)
        .layer(middleware::from_fn(extract_client_ip))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok((app, deps))
}
