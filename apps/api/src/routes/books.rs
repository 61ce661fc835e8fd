//! # Book Routes
//!
//! Mounted at `/api/v1/books`.
//!
//! ```text
//! GET    /                 list_books        200 envelope(Book[])
//! POST   /                 create_book       201 envelope(Book)
//! GET    /reserved         list_reserved     200 envelope(Book[])
//! GET    /available        list_available    200 envelope(Book[])
//! GET    /{id}             get_book          200 envelope(Book) | 404
//! PUT    /{id}             update_book       204 | 400 | 404 | 409
//! DELETE /{id}             delete_book       204 | 404
//! POST   /{id}/reserve     reserve_book      204 | 404 | 409   body: "comment"
//! POST   /{id}/unreserve   unreserve_book    204 | 404 | 409
//! GET    /{id}/history     book_history      200 envelope(Entry[]) | 404 when empty
//! ```

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use shelf_core::validation::validate_matching_ids;
use shelf_core::{Book, NewBook, ReservationHistoryEntry};

use crate::error::ApiError;
use crate::extract::{Body, BookId};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Path prefix these routes are nested under.
pub const BASE_PATH: &str = "/api/v1/books";

type ApiResult<T> = Result<T, ApiError>;

/// Book routes, relative to [`BASE_PATH`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/reserved", get(list_reserved))
        .route("/available", get(list_available))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/{id}/reserve", post(reserve_book))
        .route("/{id}/unreserve", post(unreserve_book))
        .route("/{id}/history", get(book_history))
}

async fn list_books(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Book>>> {
    let books = state.catalog().list_all().await?;
    Ok(ApiResponse::ok("Books retrieved successfully.", books))
}

async fn get_book(
    State(state): State<AppState>,
    BookId(id): BookId,
) -> ApiResult<ApiResponse<Book>> {
    let book = state.catalog().get_by_id(id).await?;
    Ok(ApiResponse::ok("Book retrieved successfully.", book))
}

async fn create_book(
    State(state): State<AppState>,
    Body(book): Body<NewBook>,
) -> ApiResult<Response> {
    let book = state.catalog().add(book).await?;
    let location = format!("{BASE_PATH}/{}", book.id);

    Ok((
        [(header::LOCATION, location)],
        ApiResponse::created("Book created successfully.", book),
    )
        .into_response())
}

async fn update_book(
    State(state): State<AppState>,
    BookId(id): BookId,
    Body(book): Body<Book>,
) -> ApiResult<StatusCode> {
    validate_matching_ids(id, book.id)?;
    state.catalog().update(book).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(State(state): State<AppState>, BookId(id): BookId) -> ApiResult<StatusCode> {
    state.catalog().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reserve_book(
    State(state): State<AppState>,
    BookId(id): BookId,
    Body(comment): Body<String>,
) -> ApiResult<StatusCode> {
    let transition = state.catalog().reserve(id, &comment).await?;
    info!(id, history_id = transition.entry.id, "Book reserved");
    Ok(StatusCode::NO_CONTENT)
}

async fn unreserve_book(
    State(state): State<AppState>,
    BookId(id): BookId,
) -> ApiResult<StatusCode> {
    let transition = state.catalog().unreserve(id).await?;
    info!(id, history_id = transition.entry.id, "Book unreserved");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_reserved(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Book>>> {
    let books = state.catalog().list_reserved().await?;
    Ok(ApiResponse::ok("Reserved books retrieved successfully.", books))
}

async fn list_available(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<Book>>> {
    let books = state.catalog().list_available().await?;
    Ok(ApiResponse::ok("Available books retrieved successfully.", books))
}

/// An id with no recorded transitions answers 404 here; the catalog itself
/// treats an empty history as a normal result.
async fn book_history(
    State(state): State<AppState>,
    BookId(id): BookId,
) -> ApiResult<ApiResponse<Vec<ReservationHistoryEntry>>> {
    let history = state.catalog().get_history(id).await?;
    if history.is_empty() {
        return Err(ApiError::not_found("No status history found for this book."));
    }
    Ok(ApiResponse::ok("Status history retrieved successfully.", history))
}
