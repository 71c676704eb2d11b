//! Movies service routes

use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{MethodRouter, delete, get, post, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    AppState,
    auth::{Capability, Subject},
    error::{ApiError, ApiResult},
    middleware::{RouteGuard, require_capability},
    models::{
        LoginRequest, MessageResponse, MovieQuery, TokenResponse,
        movie::MovieInput,
    },
    validation::{validate_login, validate_movie, validate_search},
};

/// Create the router for the movies service
pub fn create_router(state: AppState) -> Router {
    let guarded = |route: MethodRouter<AppState>, capability: Capability| {
        route.route_layer(middleware::from_fn_with_state(
            RouteGuard::new(state.auth_gate.clone(), capability),
            require_capability,
        ))
    };

    Router::new()
        .route("/", guarded(get(greeting), Capability::Greeting))
        .route("/health", guarded(get(health_check), Capability::Health))
        .route("/login", guarded(get(login).post(login), Capability::Login))
        .route("/movies", guarded(get(get_movies), Capability::ListMovies))
        .route("/movies", guarded(post(create_movie), Capability::CreateMovie))
        .route("/movies/", guarded(get(get_movies), Capability::ListMovies))
        .route("/movies/:id", guarded(get(get_movie), Capability::GetMovie))
        .route(
            "/movies/:id",
            guarded(put(update_movie), Capability::UpdateMovie),
        )
        .route(
            "/movies/:id",
            guarded(delete(delete_movie), Capability::DeleteMovie),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Static greeting page
pub async fn greeting() -> Html<&'static str> {
    Html("<h1>Welcome to the movies API</h1>")
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    let (status, summary, database) = if healthy {
        (StatusCode::OK, "ok", "up")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
    };

    (
        status,
        Json(json!({
            "status": summary,
            "service": "movies",
            "database": database,
        })),
    )
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    info!("Login attempt for user: {}", payload.user);

    validate_login(&payload)?;
    let access_token = state.auth_gate.login(&payload.user, &payload.password)?;

    let response = TokenResponse {
        user: payload.user,
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth_gate.access_token_expiry(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// List every movie, or look movies up by category and year
///
/// The lookup is its own capability, checked here because it shares the
/// path with the plain listing.
pub async fn get_movies(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<MovieQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;

    if !query.is_search() {
        let movies = state.movie_repository.list_all().await?;
        return Ok(Json(movies).into_response());
    }

    if let Some(Subject(subject)) = state
        .auth_gate
        .authorize(Capability::SearchMovies, &headers)?
    {
        info!("Movie lookup by {}", subject);
    }

    let (category, year) = validate_search(&query)?;
    let movies = state
        .movie_repository
        .find_by_category_and_year(&category, year)
        .await?;

    if movies.is_empty() {
        return Err(ApiError::NotFound("movie not found".to_string()));
    }

    Ok(Json(movies).into_response())
}

/// Get a movie by ID
pub async fn get_movie(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;

    let movie = state
        .movie_repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("id not found".to_string()))?;

    Ok(Json(movie))
}

/// Create a movie and return every stored movie
pub async fn create_movie(
    State(state): State<AppState>,
    subject: Option<Extension<Subject>>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload?;
    let movie = validate_movie(input)?;

    let created = state.movie_repository.create(&movie).await?;
    if let Some(Extension(Subject(subject))) = subject {
        info!("Movie {} created by {}", created.id, subject);
    }

    let movies = state.movie_repository.list_all().await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/movies/{}", created.id))],
        Json(movies),
    ))
}

/// Replace every field of a movie but its id
pub async fn update_movie(
    State(state): State<AppState>,
    subject: Option<Extension<Subject>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let movie = validate_movie(input)?;

    let updated = state
        .movie_repository
        .update(id, &movie)
        .await?
        .ok_or_else(|| ApiError::NotFound("id not found".to_string()))?;

    if let Some(Extension(Subject(subject))) = subject {
        info!("Movie {} updated by {}", id, subject);
    }

    Ok((StatusCode::CREATED, Json(updated)))
}

/// Delete a movie by ID
pub async fn delete_movie(
    State(state): State<AppState>,
    subject: Option<Extension<Subject>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;

    if !state.movie_repository.delete(id).await? {
        return Err(ApiError::NotFound("id not found".to_string()));
    }

    if let Some(Extension(Subject(subject))) = subject {
        info!("Movie {} deleted by {}", id, subject);
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("movie {} deleted", id),
        }),
    ))
}
