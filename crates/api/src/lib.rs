//! HTTP API server with observability for the coffy event-sourcing system.
//!
//! Provides REST endpoints for accounts, coffees, machines and the consume
//! workflow, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{AccountService, CoffeeService, ConsumeService, MachineService};
use event_store::EventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore> {
    pub accounts: AccountService<S>,
    pub coffees: CoffeeService<S>,
    pub machines: MachineService<S>,
    pub consume: ConsumeService<S>,
    pub event_store: S,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let api = Router::new()
        .route(
            "/accounts",
            get(routes::accounts::list::<S>).post(routes::accounts::create::<S>),
        )
        .route("/accounts/{id}", get(routes::accounts::get::<S>))
        .route("/accounts/{id}/payments", post(routes::accounts::pay::<S>))
        .route(
            "/coffees",
            get(routes::coffees::list::<S>).post(routes::coffees::create::<S>),
        )
        .route("/coffees/{id}", get(routes::coffees::get::<S>))
        .route(
            "/coffees/{id}/price",
            post(routes::coffees::change_price::<S>),
        )
        .route(
            "/coffees/{id}/cupping-score",
            post(routes::coffees::set_cupping_score::<S>),
        )
        .route(
            "/coffees/{id}/details",
            put(routes::coffees::update_details::<S>),
        )
        .route(
            "/machines",
            get(routes::machines::list::<S>).post(routes::machines::create::<S>),
        )
        .route(
            "/machines/{id}",
            get(routes::machines::get::<S>).patch(routes::machines::load_coffee::<S>),
        )
        .route(
            "/machines/{id}/coffee",
            get(routes::machines::current_coffee::<S>),
        )
        .route("/consume", post(routes::consume::consume::<S>))
        .route("/events/{id}", get(routes::events::list::<S>));

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api/v1", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with all services sharing one event store.
pub fn create_default_state<S: EventStore + Clone + 'static>(event_store: S) -> Arc<AppState<S>> {
    let accounts = AccountService::new(event_store.clone());
    let coffees = CoffeeService::new(event_store.clone());
    let machines = MachineService::new(event_store.clone());
    let consume = ConsumeService::new(accounts.clone(), coffees.clone());

    Arc::new(AppState {
        accounts,
        coffees,
        machines,
        consume,
        event_store,
    })
}
