pub mod normalizer;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

/// Stateless URL processing module
pub struct UrlsModule;

impl UrlsModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for UrlsModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for UrlsModule {
    fn name(&self) -> &'static str {
        "urls"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            redirect_host = normalizer::REDIRECT_HOST,
            "urls module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router()
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/process-url": {
                    "post": {
                        "summary": "Process a URL (canonical/redirection/all)",
                        "tags": ["url"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ProcessUrlRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Processed URL",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ProcessUrlResponse" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Invalid body, operation, or URL",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "ProcessUrlRequest": {
                        "type": "object",
                        "properties": {
                            "url": { "type": "string" },
                            "operation": {
                                "type": "string",
                                "enum": ["canonical", "redirection", "all"]
                            }
                        },
                        "required": ["url", "operation"]
                    },
                    "ProcessUrlResponse": {
                        "type": "object",
                        "properties": {
                            "processed_url": { "type": "string" }
                        },
                        "required": ["processed_url"]
                    }
                }
            }
        }))
    }
}
