use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use persistence::registry::AppRegistry;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{
    daily_preferences, events, health, host_assignments, openapi, registrations, users,
    vehicle_shares,
};

#[derive(Clone)]
pub struct AppState {
    pub registry: AppRegistry,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, registry: AppRegistry) -> Router {
    let config = Arc::new(config);

    let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        registry,
        config: config.clone(),
        rate_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        // Users and their daily preferences
        .route("/api/v1/users", post(users::create_user).get(users::list_users))
        .route(
            "/api/v1/users/:user_id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/v1/users/:user_id/preferences",
            get(daily_preferences::list_preferences),
        )
        .route(
            "/api/v1/users/:user_id/preferences/:date",
            get(daily_preferences::get_preference)
                .put(daily_preferences::put_preference)
                .delete(daily_preferences::delete_preference),
        )
        // Events
        .route(
            "/api/v1/events",
            post(events::create_event).get(events::list_events),
        )
        .route(
            "/api/v1/events/:event_id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/api/v1/events/:event_id/summary",
            get(events::get_event_summary),
        )
        // Registrations
        .route(
            "/api/v1/events/:event_id/registrations",
            post(registrations::create_registration).get(registrations::list_registrations),
        )
        .route(
            "/api/v1/events/:event_id/participants/search",
            get(registrations::search_participant),
        )
        .route(
            "/api/v1/registrations/:registration_id",
            get(registrations::get_registration),
        )
        .route(
            "/api/v1/registrations/:registration_id/cancel",
            post(registrations::cancel_registration),
        )
        .route(
            "/api/v1/registrations/:registration_id/status",
            put(registrations::update_registration_status),
        )
        // Hosts
        .route(
            "/api/v1/events/:event_id/hosts",
            post(host_assignments::assign_host).get(host_assignments::list_hosts),
        )
        .route(
            "/api/v1/events/:event_id/hosts/bulk",
            post(host_assignments::assign_hosts_bulk),
        )
        .route(
            "/api/v1/host-assignments/:assignment_id",
            get(host_assignments::get_host_assignment)
                .patch(host_assignments::update_host_assignment)
                .delete(host_assignments::unassign_host),
        )
        // Vehicle sharing
        .route(
            "/api/v1/events/:event_id/vehicle-shares",
            post(vehicle_shares::create_vehicle_share).get(vehicle_shares::list_vehicle_shares),
        )
        .route(
            "/api/v1/vehicle-shares/:share_id",
            get(vehicle_shares::get_vehicle_share)
                .patch(vehicle_shares::update_vehicle_share)
                .delete(vehicle_shares::delete_vehicle_share),
        )
        .route(
            "/api/v1/vehicle-shares/:share_id/passengers",
            post(vehicle_shares::join_vehicle_share),
        )
        .route(
            "/api/v1/vehicle-shares/:share_id/passengers/:user_id",
            axum::routing::delete(vehicle_shares::leave_vehicle_share),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Probes and metrics are never rate limited
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route("/docs", get(openapi::swagger_ui_redirect))
        .route("/docs/", get(openapi::swagger_ui))
        .route("/docs/openapi.yaml", get(openapi::openapi_spec))
        .route("/docs/*path", get(openapi::swagger_ui))
        .route("/redoc", get(openapi::redoc));

    Router::new()
        .merge(public_routes)
        .merge(docs_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
