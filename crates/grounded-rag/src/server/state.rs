//! Application state for the RAG server

use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::RagConfig;
use crate::error::Result;
use crate::service::RagService;
use crate::types::Document;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Index, ingestion pipeline and query engine
    service: RagService,
    /// Document registry
    documents: DashMap<Uuid, Document>,
}

impl AppState {
    /// Create state around an already wired service
    pub fn new(config: RagConfig, service: RagService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                service,
                documents: DashMap::new(),
            }),
        }
    }

    /// Create state with the providers named by the config
    pub fn from_config(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");
        let service = RagService::from_config(&config)?;
        Ok(Self::new(config, service))
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the RAG service
    pub fn service(&self) -> &RagService {
        &self.inner.service
    }

    /// Add a document to the registry
    pub fn add_document(&self, doc: Document) {
        self.inner.documents.insert(doc.id, doc);
    }

    /// Get a document by ID
    pub fn get_document(&self, id: &Uuid) -> Option<Document> {
        self.inner.documents.get(id).map(|d| d.clone())
    }

    /// List all documents, oldest first
    pub fn list_documents(&self) -> Vec<Document> {
        let mut documents: Vec<Document> = self
            .inner
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        documents.sort_by_key(|d| d.uploaded_at);
        documents
    }
}
