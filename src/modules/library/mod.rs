pub mod dto;
pub mod id;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use quill_kernel::{InitCtx, Module};
use serde_json::json;

use id::{IdGenerator, UuidV7Generator};
use repository::{EbookRepository, InMemoryEbookRepository};
use routes::LibraryState;
use service::EbookService;
use validation::{FieldValidator, DESCRIPTION_MAX_LEN, SALES_DESCRIPTION_MAX_LEN, TITLE_MAX_LEN};

/// Digital product catalogue: ebook creation.
pub struct LibraryModule {
    state: LibraryState,
}

impl LibraryModule {
    /// Wire the module around the given storage and identifier source.
    pub fn new(repository: Arc<dyn EbookRepository>, ids: Arc<dyn IdGenerator>) -> Self {
        let validator = Arc::new(FieldValidator::ebook_entity());
        let service = EbookService::new(ids, repository, validator);
        Self {
            state: LibraryState {
                service: Arc::new(service),
                validator: Arc::new(FieldValidator::ebook()),
            },
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryEbookRepository::new()),
            Arc::new(UuidV7Generator::new()),
        )
    }
}

#[async_trait]
impl Module for LibraryModule {
    fn name(&self) -> &'static str {
        "library"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "library module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/ebooks": {
                    "post": {
                        "summary": "Create an ebook",
                        "tags": ["Library"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateEbook" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Ebook created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Ebook" }
                                    }
                                }
                            },
                            "400": error_response("Malformed payload"),
                            "409": error_response("Title already used by this producer"),
                            "422": error_response("Validation error"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Library health check",
                        "tags": ["Library"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CreateEbook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": TITLE_MAX_LEN },
                            "description": {
                                "type": "string",
                                "maxLength": DESCRIPTION_MAX_LEN
                            },
                            "salesDescription": {
                                "type": "string",
                                "maxLength": SALES_DESCRIPTION_MAX_LEN
                            },
                            "price": {
                                "type": "integer",
                                "format": "int64",
                                "minimum": 1,
                                "description": "Minor currency units"
                            },
                            "promotionalPrice": {
                                "type": "integer",
                                "format": "int64",
                                "minimum": 0,
                                "description": "Must be below price"
                            },
                            "coverImage": { "type": "string", "format": "uri" },
                            "available": { "type": "string" },
                            "producerId": { "type": "string" },
                            "fileIds": {
                                "type": "array",
                                "items": { "type": "string", "format": "uuid" }
                            },
                            "showSalesStatistics": { "type": "boolean" }
                        },
                        "required": ["title", "price", "producerId"]
                    },
                    "Ebook": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Time-ordered UUIDv7" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "salesDescription": { "type": "string" },
                            "price": { "type": "integer", "format": "int64" },
                            "promotionalPrice": { "type": "integer", "format": "int64" },
                            "coverImage": { "type": "string", "format": "uri" },
                            "available": { "type": "string" },
                            "producerId": { "type": "string" },
                            "fileIds": {
                                "type": "array",
                                "items": { "type": "string", "format": "uuid" }
                            },
                            "showSalesStatistics": { "type": "boolean" },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": [
                            "id",
                            "title",
                            "price",
                            "producerId",
                            "fileIds",
                            "showSalesStatistics"
                        ]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "library module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "library module stopped");
        Ok(())
    }
}

/// Create the library module backed by in-memory storage.
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(LibraryModule::in_memory())
}
