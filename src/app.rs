// app.rs - Router assembly
//
// Three route groups share one state:
// - public: token acquisition, service info, liveness
// - protected: jwt_auth_middleware then validate_user_middleware
// - elevated: protected stack plus require_superuser_middleware

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{config, SecurityConfig};
use crate::database::models::{Investment, Reservoir, Subsidy, Trellis};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_superuser_middleware, validate_user_middleware};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Build the complete application router
pub fn app(state: AppState) -> Router {
    let settings = config();

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(elevated_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&settings.security))
                .layer(DefaultBodyLimit::max(settings.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .route("/login", post(public::login_post))
        .route("/refresh", post(public::refresh_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{farmers, plantations, reference, user_info};

    Router::new()
        .route("/user_info", get(user_info::user_info_get))
        // Plantations
        .route("/plantations", get(plantations::list_get))
        .route("/plantations/full", get(plantations::full_get))
        .route("/plantations/map", get(plantations::map_get))
        .route("/plantations/create", post(plantations::create_post))
        .route(
            "/plantations/:id",
            get(plantations::record_get)
                .put(plantations::record_put)
                .patch(plantations::record_patch)
                .delete(plantations::record_delete),
        )
        // Child records of a plantation
        .merge(resource_routes::<Subsidy>("/subsidies"))
        .merge(resource_routes::<Investment>("/investments"))
        .merge(resource_routes::<Reservoir>("/reservoirs"))
        .merge(resource_routes::<Trellis>("/trellises"))
        // Farmers
        .route("/farmers", get(farmers::list_get).post(farmers::create_post))
        .route(
            "/farmers/:id",
            get(farmers::record_get)
                .put(farmers::record_put)
                .delete(farmers::record_delete),
        )
        // Reference data
        .route("/fruits", get(reference::fruits_get))
        .route("/regions", get(reference::regions_get))
        .route("/districts", get(reference::districts_get))
        .route("/rootstocks", get(reference::rootstocks_get).post(reference::rootstock_post))
        .route(
            "/rootstocks/:id",
            get(reference::rootstock_get)
                .put(reference::rootstock_put)
                .delete(reference::rootstock_delete),
        )
        .route_layer(from_fn_with_state(state, validate_user_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn resource_routes<T>(base: &str) -> Router<AppState>
where
    T: crate::database::repository::ChildResource,
    T::Input: serde::de::DeserializeOwned,
{
    use protected::resources;

    Router::new()
        .route(base, get(resources::list_get::<T>).post(resources::create_post::<T>))
        .route(
            &format!("{}/:id", base),
            get(resources::record_get::<T>)
                .put(resources::record_put::<T>)
                .delete(resources::record_delete::<T>),
        )
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::{districts, statistics, users};

    Router::new()
        .route("/users", get(users::list_get).post(users::create_post))
        .route("/users/:id", get(users::record_get))
        .route("/districts/create", post(districts::create_post))
        .route("/statistics", get(statistics::statistics_get))
        .route_layer(from_fn(require_superuser_middleware))
        .route_layer(from_fn_with_state(state, validate_user_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
}
