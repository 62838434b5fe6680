use crate::dtos::Pagination;
use crate::models::{Hero, HeroChanges, HeroId, NewHero};
use crate::services::store::{HeroStore, HeroStream};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use mongodb::bson::{self, Document};
use service_core::error::AppError;
use tokio::sync::RwLock;

/// Process-local store keeping hero documents in insertion order.
///
/// Mirrors the MongoDB backend's semantics for single-document operations;
/// selected with `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct InMemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn matches_id(document: &Document, id: &HeroId) -> bool {
    document
        .get_object_id("_id")
        .map(|oid| &oid == id.as_object_id())
        .unwrap_or(false)
}

#[async_trait]
impl HeroStore for InMemoryStore {
    async fn insert_one(&self, hero: NewHero) -> Result<HeroId, AppError> {
        let id = HeroId::new();
        let document = bson::to_document(&Hero::from_new(id, hero))?;
        self.documents.write().await.push(document);
        Ok(id)
    }

    async fn find_one(&self, id: &HeroId) -> Result<Option<Hero>, AppError> {
        let found = {
            let documents = self.documents.read().await;
            documents.iter().find(|d| matches_id(d, id)).cloned()
        };
        Ok(found.map(bson::from_document).transpose()?)
    }

    async fn find(&self, page: Pagination) -> Result<HeroStream, AppError> {
        let page_docs: Vec<Document> = {
            let documents = self.documents.read().await;
            documents
                .iter()
                .skip(page.skip as usize)
                .take(page.limit as usize)
                .cloned()
                .collect()
        };

        Ok(stream::iter(page_docs)
            .map(|d| bson::from_document::<Hero>(d).map_err(AppError::from))
            .boxed())
    }

    async fn update_one(&self, id: &HeroId, changes: HeroChanges) -> Result<u64, AppError> {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|d| matches_id(d, id)) {
            Some(document) => {
                for (field, value) in changes.into_document() {
                    document.insert(field, value);
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, id: &HeroId) -> Result<u64, AppError> {
        let mut documents = self.documents.write().await;
        let position = documents.iter().position(|d| matches_id(d, id));
        if let Some(index) = position {
            documents.remove(index);
            return Ok(1);
        }
        Ok(0)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("Dropping in-memory hero store");
        self.documents.write().await.clear();
    }
}
