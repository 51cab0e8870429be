pub mod models;
pub mod routes;
pub mod store;
pub mod validation;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use store::BookStore;

/// Books module: CRUD over the `books` table
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            operation_timeout_ms = self.store.timeout().as_millis() as u64,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Book ID",
            "schema": { "type": "integer", "format": "int64", "minimum": 1 }
        });
        let draft_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["books"],
                        "responses": {
                            "200": {
                                "description": "Books ordered by id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a new book",
                        "tags": ["books"],
                        "requestBody": draft_body.clone(),
                        "responses": {
                            "201": book("Created book"),
                            "400": error("Invalid JSON body or validation failure"),
                            "500": error("Internal server error")
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book by ID",
                        "tags": ["books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": book("Book"),
                            "400": error("Invalid id"),
                            "404": error("Book not found"),
                            "500": error("Internal server error")
                        }
                    },
                    "put": {
                        "summary": "Update a book by ID",
                        "tags": ["books"],
                        "parameters": [id_param.clone()],
                        "requestBody": draft_body,
                        "responses": {
                            "200": book("Updated book"),
                            "400": error("Invalid id, JSON body, or validation failure"),
                            "404": error("Book not found"),
                            "500": error("Internal server error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book by ID",
                        "tags": ["books"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "No Content" },
                            "400": error("Invalid id"),
                            "404": error("Book not found"),
                            "500": error("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer", "format": "int64" }
                        },
                        "required": ["id", "title", "author", "year"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "year": { "type": "integer", "format": "int64", "minimum": 1 }
                        },
                        "required": ["title", "author", "year"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id     INTEGER PRIMARY KEY AUTOINCREMENT,
                    title  TEXT NOT NULL,
                    author TEXT NOT NULL,
                    year   INTEGER NOT NULL CHECK (year > 0)
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}
