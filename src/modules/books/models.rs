use serde::{Deserialize, Serialize};

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, positive once persisted
    pub id: i64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication year
    pub year: i64,
}

/// Candidate book supplied by a caller for create or update.
///
/// Missing fields decode to their zero value so that validation, not the
/// decoder, reports what is wrong. Any `id` in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: i64,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Attach an identifier, producing the full record.
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            year: self.year,
        }
    }
}
