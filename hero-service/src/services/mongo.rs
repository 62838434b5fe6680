use crate::dtos::Pagination;
use crate::models::{Hero, HeroChanges, HeroId, NewHero};
use crate::services::store::{HeroStore, HeroStream};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use mongodb::{bson::doc, options::FindOptions, Client as MongoClient, Collection, Database};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self {
            client,
            db,
            collection: collection.to_string(),
        })
    }

    pub fn heroes(&self) -> Collection<Hero> {
        self.db.collection(&self.collection)
    }

    fn new_heroes(&self) -> Collection<NewHero> {
        self.db.collection(&self.collection)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl HeroStore for MongoDb {
    async fn insert_one(&self, hero: NewHero) -> Result<HeroId, AppError> {
        let result = self.new_heroes().insert_one(&hero, None).await?;
        HeroId::try_from(result.inserted_id).map_err(|_| {
            AppError::DatabaseError(anyhow::anyhow!("Store assigned a non-ObjectId _id"))
        })
    }

    async fn find_one(&self, id: &HeroId) -> Result<Option<Hero>, AppError> {
        let hero = self
            .heroes()
            .find_one(doc! { "_id": id.as_object_id() }, None)
            .await?;
        Ok(hero)
    }

    async fn find(&self, page: Pagination) -> Result<HeroStream, AppError> {
        // A zero limit means "no limit" to MongoDB.
        if page.limit == 0 {
            return Ok(stream::empty().boxed());
        }

        let find_options = FindOptions::builder()
            .skip(page.skip)
            .limit(page.limit as i64)
            .build();

        let cursor = self.heroes().find(doc! {}, find_options).await?;
        Ok(cursor.map_err(AppError::from).boxed())
    }

    async fn update_one(&self, id: &HeroId, changes: HeroChanges) -> Result<u64, AppError> {
        let result = self
            .heroes()
            .update_one(
                doc! { "_id": id.as_object_id() },
                doc! { "$set": changes.into_document() },
                None,
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, id: &HeroId) -> Result<u64, AppError> {
        let result = self
            .heroes()
            .delete_one(doc! { "_id": id.as_object_id() }, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}
