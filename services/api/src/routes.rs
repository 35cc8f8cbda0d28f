//! API service routes
//!
//! Registration, login, and the movie listing are public; create, update,
//! and delete sit behind the bearer-token middleware and enforce per-record
//! ownership.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{self, ApiError},
    middleware::{AuthUser, auth_middleware},
    models::{
        ListMeta, LoginRequest, LoginResponse, Movie, MovieInput, MovieListResponse, MovieQuery,
        RegisterRequest, RegisterResponse,
    },
    state::AppState,
    validation,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/movies", post(create_movie))
        .route("/api/movies/:id", put(update_movie))
        .route("/api/movies/:id", delete(delete_movie))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/:id", get(get_movie))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "movie-catalog-api"
    }))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_registration(&payload).map_err(ApiError::Validation)?;

    let existing = state
        .user_repository
        .find_by_username(&payload.username)
        .await
        .map_err(|e| {
            error!("Failed to look up username: {}", e);
            ApiError::InternalServerError
        })?;

    if existing.is_some() {
        return Err(ApiError::Conflict("Username is already taken".to_string()));
    }

    // The unique constraint backstops the pre-check when two registrations
    // for the same username race.
    let user = state.user_repository.create(&payload).await.map_err(|e| {
        if error::is_unique_violation(&e) {
            return ApiError::Conflict("Username is already taken".to_string());
        }
        error!("Failed to create user: {}", e);
        ApiError::InternalServerError
    })?;

    info!("Registered user {} ({})", user.username, user.id);

    let response = RegisterResponse {
        id: user.id,
        username: user.username,
        name: user.name,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log a user in and issue a session token
///
/// A missing user and a wrong password produce the same error, so the
/// endpoint cannot be used to enumerate usernames.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_username(&payload.username)
        .await
        .map_err(|e| {
            error!("Failed to look up username: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::InvalidCredentials)?;

    let verified = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;

    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.jwt_service.generate_token(&user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        ApiError::InternalServerError
    })?;

    info!("User {} logged in", user.username);

    let response = LoginResponse {
        token,
        id: user.id,
        username: user.username,
        name: user.name,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// List movies with optional search filter and pagination
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (movies, total) = state.movie_repository.list(&query).await.map_err(|e| {
        error!("Failed to list movies: {}", e);
        ApiError::InternalServerError
    })?;

    let response = MovieListResponse {
        data: movies,
        meta: ListMeta::new(total, query.page(), query.limit()),
    };

    Ok(Json(response))
}

/// Get a movie by ID
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;

    let movie = state
        .movie_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to get movie: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    Ok(Json(movie))
}

/// Create a movie owned by the authenticated user
pub async fn create_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MovieInput>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_movie(&payload).map_err(ApiError::Validation)?;

    let movie = state
        .movie_repository
        .create(user.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to create movie: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(movie)))
}

/// Update a movie, owner only
pub async fn update_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<MovieInput>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    validation::validate_movie(&payload).map_err(ApiError::Validation)?;

    let existing = fetch_movie(&state, id).await?;
    ensure_owner(&existing, &user)?;

    let movie = state
        .movie_repository
        .update(id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update movie: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

    Ok(Json(movie))
}

/// Delete a movie, owner only
pub async fn delete_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let existing = fetch_movie(&state, id).await?;
    ensure_owner(&existing, &user)?;

    let deleted = state.movie_repository.delete(id).await.map_err(|e| {
        error!("Failed to delete movie: {}", e);
        ApiError::InternalServerError
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Movie not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Movie deleted",
        "deleted": existing
    })))
}

/// Parse the `:id` path segment
///
/// A non-numeric id cannot name a record, so it behaves like a missing one
/// and keeps the error body JSON.
fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Movie not found".to_string()))
}

async fn fetch_movie(state: &AppState, id: i32) -> Result<Movie, ApiError> {
    state
        .movie_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to get movie: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))
}

/// Ownership gate for mutating routes
///
/// Unowned rows have no `user_id` and therefore no authorized mutator;
/// missing ownership is never treated as owned by everyone.
fn ensure_owner(movie: &Movie, user: &AuthUser) -> Result<(), ApiError> {
    match movie.user_id {
        Some(owner_id) if owner_id == user.id => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}
