//! HTTP handlers for `/books`.

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::get,
    Json, Router,
};
use bookshelf_http::{
    error::{AppError, AppResult},
    extract::JsonBody,
};

use super::models::{Book, BookDraft};
use super::store::{BookStore, StoreError};
use crate::utils;

const INVALID_ID: &str = "invalid id";
const BOOK_NOT_FOUND: &str = "book not found";

/// Build the `/books` router over the given store.
pub fn router(store: BookStore) -> Router {
    let prefix = utils::log_prefix("books");
    tracing::debug!(target: "bookshelf.routes", %prefix, "registering books routes");

    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(e) => AppError::bad_request(e.to_string()),
            StoreError::NotFound => AppError::not_found(BOOK_NOT_FOUND),
            other => AppError::internal(other),
        }
    }
}

/// Positive book identifier taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookId(pub i64);

impl BookId {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Some(Self(id)),
            _ => None,
        }
    }
}

impl<S> FromRequestParts<S> for BookId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request(INVALID_ID))?;
        Self::parse(&raw).ok_or_else(|| AppError::bad_request(INVALID_ID))
    }
}

async fn list_books(State(store): State<BookStore>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(store.list().await?))
}

async fn create_book(
    State(store): State<BookStore>,
    JsonBody(draft): JsonBody<BookDraft>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = store.create(draft).await?;
    tracing::info!(book_id = book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(State(store): State<BookStore>, BookId(id): BookId) -> AppResult<Json<Book>> {
    Ok(Json(store.get(id).await?))
}

async fn update_book(
    State(store): State<BookStore>,
    BookId(id): BookId,
    JsonBody(draft): JsonBody<BookDraft>,
) -> AppResult<Json<Book>> {
    let book = store.update(id, draft).await?;
    tracing::info!(book_id = book.id, "book updated");
    Ok(Json(book))
}

async fn delete_book(State(store): State<BookStore>, BookId(id): BookId) -> AppResult<StatusCode> {
    store.delete(id).await?;
    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
