use crate::dtos::Pagination;
use crate::models::{Hero, HeroChanges, HeroId, NewHero};
use async_trait::async_trait;
use futures::stream::BoxStream;
use service_core::error::AppError;

/// Lazily yielded page of heroes.
pub type HeroStream = BoxStream<'static, Result<Hero, AppError>>;

/// The document store behind the hero handlers.
///
/// Each call is a single-document operation; atomicity per document is
/// whatever the backend provides.
#[async_trait]
pub trait HeroStore: Send + Sync {
    /// Insert a hero and return the id the store assigned to it.
    async fn insert_one(&self, hero: NewHero) -> Result<HeroId, AppError>;

    async fn find_one(&self, id: &HeroId) -> Result<Option<Hero>, AppError>;

    /// Heroes in natural order, after skipping `page.skip`, at most `page.limit`.
    async fn find(&self, page: Pagination) -> Result<HeroStream, AppError>;

    /// Apply `changes` to the hero with `id`; returns the matched count.
    async fn update_one(&self, id: &HeroId, changes: HeroChanges) -> Result<u64, AppError>;

    /// Returns the deleted count.
    async fn delete_one(&self, id: &HeroId) -> Result<u64, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    /// Release the backend connection. Called once on shutdown.
    async fn close(&self);
}
