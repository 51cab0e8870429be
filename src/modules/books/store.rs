//! SQLite-backed persistence for books.
//!
//! Every operation is bounded by the store's operation timeout. Dropping the
//! returned future (for instance when the client disconnects and axum drops
//! the handler) cancels the in-flight query as well.

use std::future::Future;
use std::time::Duration;

use sqlx::sqlite::SqlitePool;
use thiserror::Error;

use super::models::{Book, BookDraft};
use super::validation::{validate, ValidationError};

/// Upper bound on a single store operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The candidate book failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// No book has the requested identifier.
    #[error("book not found")]
    NotFound,

    /// The operation did not finish within the store's bound.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Driver or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Book persistence over a shared connection pool.
#[derive(Debug, Clone)]
pub struct BookStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl BookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                tracing::error!(operation, error = %e, "book store query failed");
                StoreError::Database(e)
            }),
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "book store operation timed out"
                );
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    /// All books ordered by identifier.
    pub async fn list(&self) -> StoreResult<Vec<Book>> {
        self.bounded(
            "list",
            sqlx::query_as::<_, Book>("SELECT id, title, author, year FROM books ORDER BY id ASC")
                .fetch_all(&self.pool),
        )
        .await
    }

    pub async fn get(&self, id: i64) -> StoreResult<Book> {
        self.bounded(
            "get",
            sqlx::query_as::<_, Book>("SELECT id, title, author, year FROM books WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Validate and insert a new book; the identifier comes from the table's
    /// autoincrement column and is never reused.
    pub async fn create(&self, draft: BookDraft) -> StoreResult<Book> {
        validate(&draft)?;

        let result = self
            .bounded(
                "create",
                sqlx::query("INSERT INTO books (title, author, year) VALUES (?, ?, ?)")
                    .bind(draft.title.as_str())
                    .bind(draft.author.as_str())
                    .bind(draft.year)
                    .execute(&self.pool),
            )
            .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(book_id = id, "book created");
        Ok(draft.into_book(id))
    }

    /// Replace title, author, and year of an existing book.
    pub async fn update(&self, id: i64, draft: BookDraft) -> StoreResult<Book> {
        validate(&draft)?;
        let book = draft.into_book(id);

        let result = self
            .bounded(
                "update",
                sqlx::query("UPDATE books SET title = ?, author = ?, year = ? WHERE id = ?")
                    .bind(book.title.as_str())
                    .bind(book.author.as_str())
                    .bind(book.year)
                    .bind(book.id)
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(book_id = id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = self
            .bounded(
                "delete",
                sqlx::query("DELETE FROM books WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(book_id = id, "book deleted");
        Ok(())
    }
}
