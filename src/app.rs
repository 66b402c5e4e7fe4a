use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::data::{
    characters, profession_levels, resource, users, Bestiary, Characters, Classes, Dungeons, Equipment, Professions,
    Resources,
};
use crate::handlers::{protected, public};
use crate::middleware::require_bearer;
use crate::state::AppState;

/// Build the full router over the given state.
pub fn app(state: AppState) -> Router {
    let mut data = data_routes();
    if state.config.security.require_auth {
        data = data.route_layer(from_fn_with_state(state.clone(), require_bearer));
    }

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/signup", post(public::signup))
        .route("/login", post(public::login))
        // Bearer token
        .merge(protected_routes(&state))
        // Game data
        .merge(data)
        .layer(cors_layer(&state.config.security.cors_origins));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/protected", get(protected::protected))
        .route_layer(from_fn_with_state(state.clone(), require_bearer))
}

fn data_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list))
        .route("/clases", get(resource::list::<Classes>).post(resource::create::<Classes>))
        .route(
            "/clases/:id",
            get(resource::get::<Classes>)
                .put(resource::update::<Classes>)
                .delete(resource::delete::<Classes>),
        )
        .route("/oficios", get(resource::list::<Professions>))
        .route(
            "/oficios/:id",
            get(resource::get::<Professions>).patch(resource::update::<Professions>),
        )
        .route(
            "/oficioslevel",
            get(profession_levels::list).patch(profession_levels::update),
        )
        .route("/personajes", get(resource::list::<Characters>).post(characters::create))
        .route("/personajes/:user_id", get(characters::profile))
        .route("/mazmorras", get(resource::list::<Dungeons>))
        .route("/mazmorras/:id", get(resource::get::<Dungeons>))
        .route("/equipamiento", get(resource::list::<Equipment>))
        .route("/equipamiento/:id", get(resource::get::<Equipment>))
        .route("/recursos", get(resource::list::<Resources>))
        .route("/recursos/:id", get(resource::get::<Resources>))
        .route("/bestiario", get(resource::list::<Bestiary>))
        .route("/bestiario/:id", get(resource::get::<Bestiary>))
}

/// Allow-list of browser origins; any method and header.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
