/// Application state and router builder
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use todo_api::{app::{build_router, AppState}, config::Config};
/// use todo_shared::store::memory::MemoryStore;
///
/// let vars = HashMap::from([
///     ("JWT_SECRET", "an-example-secret-that-is-32-chars!"),
///     ("STORAGE_BACKEND", "memory"),
/// ]);
/// let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
///
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_auth, security::SecurityHeadersLayer},
    routes::tasks::TOTAL_COUNT_HEADER,
};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use todo_shared::{
    auth::jwt::TokenService,
    services::{tasks::TaskService, users::UserDirectory},
    store::{StoreHealth, TaskStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through axum's `State` extractor; every field is
/// a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub users: UserDirectory,
    pub tasks: TaskService,
    pub tokens: Arc<TokenService>,

    /// Storage backend liveness for `/health`
    pub health: Arc<dyn StoreHealth>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Builds state over a single storage backend
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: UserStore + TaskStore + StoreHealth + 'static,
    {
        let tokens = TokenService::new(&config.jwt.secret, config.token_ttl());

        Self {
            users: UserDirectory::new(store.clone()),
            tasks: TaskService::new(store.clone(), config.pagination()),
            tokens: Arc::new(tokens),
            health: store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /api
///     ├── /auth
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /logout
///     │   └── GET  /me                          (auth)
///     └── /:user_id/tasks                       (auth)
///         ├── GET | POST /
///         ├── GET | PUT | DELETE /:task_id
///         └── PATCH /:task_id/complete
/// ```
///
/// Unmatched routes answer with a 404 envelope and known paths hit with the
/// wrong method with a 405 envelope. On protected paths the 405 is only
/// reached after authentication.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .method_not_allowed_fallback(routes::method_not_allowed)
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .method_not_allowed_fallback(routes::method_not_allowed)
                .route_layer(from_fn_with_state(state.clone(), require_auth)),
        );

    let task_routes = Router::new()
        .route(
            "/:user_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:user_id/tasks/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/:user_id/tasks/:task_id/complete",
            patch(routes::tasks::toggle_task),
        )
        .method_not_allowed_fallback(routes::method_not_allowed)
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(task_routes);

    let cors = if state.config.cors_allows_any() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers([HeaderName::from_static(TOTAL_COUNT_HEADER)])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .method_not_allowed_fallback(routes::method_not_allowed)
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
