use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Store-assigned hero identifier: a 12-byte BSON ObjectId.
///
/// Only obtainable by parsing 24 hex digits or from an id the store
/// assigned, so a `HeroId` is always well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeroId(ObjectId);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid hero ID format")]
pub struct InvalidHeroId;

impl From<InvalidHeroId> for AppError {
    fn from(err: InvalidHeroId) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

impl HeroId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> &ObjectId {
        &self.0
    }
}

impl Default for HeroId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for HeroId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for HeroId {
    type Err = InvalidHeroId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(Self).map_err(|_| InvalidHeroId)
    }
}

impl TryFrom<Bson> for HeroId {
    type Error = InvalidHeroId;

    fn try_from(value: Bson) -> Result<Self, Self::Error> {
        value.as_object_id().map(Self).ok_or(InvalidHeroId)
    }
}

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// A hero as stored in the `heroes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    #[serde(rename = "_id")]
    pub id: HeroId,
    pub name: String,
    pub secret_name: String,
    #[serde(default)]
    pub age: Option<i64>,
}

/// Fields of a hero before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHero {
    pub name: String,
    pub secret_name: String,
    pub age: Option<i64>,
}

impl Hero {
    pub fn from_new(id: HeroId, hero: NewHero) -> Self {
        Self {
            id,
            name: hero.name,
            secret_name: hero.secret_name,
            age: hero.age,
        }
    }
}

/// The fields a partial update sets, keyed by stored field name.
///
/// A key that is absent leaves the stored value alone; a key mapped to
/// `Bson::Null` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeroChanges(Document);

impl HeroChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static str, value: impl Into<Bson>) {
        self.0.insert(field, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.0.get(field)
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}
