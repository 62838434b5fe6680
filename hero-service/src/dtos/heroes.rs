use crate::models::{Hero, HeroChanges, NewHero};
use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer, Serialize};
use service_core::error::AppError;
use validator::Validate;

/// Maximum page size for `GET /heroes/`.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest `skip` the store accepts; MongoDB encodes it as a signed 64-bit int.
pub const MAX_SKIP: u64 = i64::MAX as u64;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHeroRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "secret_name must not be empty"))]
    pub secret_name: String,
    pub age: Option<i64>,
}

impl From<CreateHeroRequest> for NewHero {
    fn from(req: CreateHeroRequest) -> Self {
        Self {
            name: req.name,
            secret_name: req.secret_name,
            age: req.age,
        }
    }
}

/// Body of `PATCH /heroes/{id}`.
///
/// Outer `None` means the field was not sent; `Some(None)` means it was sent
/// as `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHeroRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub secret_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub age: Option<Option<i64>>,
}

fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateHeroRequest {
    /// Collect the fields the client sent into a change set.
    ///
    /// `name` and `secret_name` may be changed but never cleared or emptied;
    /// `age: null` clears the stored age.
    pub fn into_changes(self) -> Result<HeroChanges, AppError> {
        let mut changes = HeroChanges::new();

        if let Some(name) = self.name {
            changes.set("name", required_text("name", name)?);
        }
        if let Some(secret_name) = self.secret_name {
            changes.set("secret_name", required_text("secret_name", secret_name)?);
        }
        if let Some(age) = self.age {
            changes.set("age", age.map(Bson::Int64).unwrap_or(Bson::Null));
        }

        Ok(changes)
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(AppError::UnprocessableEntity(anyhow::anyhow!(
            "{} must not be empty",
            field
        ))),
        None => Err(AppError::UnprocessableEntity(anyhow::anyhow!(
            "{} must not be null",
            field
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub secret_name: String,
    pub age: Option<i64>,
}

impl From<Hero> for HeroResponse {
    fn from(hero: Hero) -> Self {
        Self {
            id: hero.id.to_string(),
            name: hero.name,
            secret_name: hero.secret_name,
            age: hero.age,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HeroListParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// A clamped page window over the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl From<HeroListParams> for Pagination {
    fn from(params: HeroListParams) -> Self {
        Self {
            skip: params.skip.unwrap_or(0).min(MAX_SKIP),
            limit: params.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteHeroResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> UpdateHeroRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn omitted_fields_produce_no_changes() {
        let changes = update("{}").into_changes().unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn only_sent_fields_are_changed() {
        let changes = update(r#"{"name":"Deadpond Updated","age":31}"#)
            .into_changes()
            .unwrap();

        let mut fields: Vec<_> = changes.fields().collect();
        fields.sort_unstable();
        assert_eq!(fields, vec!["age", "name"]);
        assert_eq!(changes.get("age"), Some(&Bson::Int64(31)));
        assert_eq!(
            changes.get("name"),
            Some(&Bson::String("Deadpond Updated".to_string()))
        );
    }

    #[test]
    fn explicit_null_age_clears_it() {
        let req = update(r#"{"age":null}"#);
        assert_eq!(req.age, Some(None));

        let changes = req.into_changes().unwrap();
        assert_eq!(changes.get("age"), Some(&Bson::Null));
    }

    #[test]
    fn required_fields_cannot_be_nulled_or_emptied() {
        assert!(matches!(
            update(r#"{"name":null}"#).into_changes(),
            Err(AppError::UnprocessableEntity(_))
        ));
        assert!(matches!(
            update(r#"{"secret_name":""}"#).into_changes(),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn pagination_defaults_and_cap() {
        let default = Pagination::from(HeroListParams {
            skip: None,
            limit: None,
        });
        assert_eq!(default, Pagination { skip: 0, limit: 100 });

        let capped = Pagination::from(HeroListParams {
            skip: Some(5),
            limit: Some(500),
        });
        assert_eq!(capped, Pagination { skip: 5, limit: 100 });
    }

    #[test]
    fn pagination_caps_skip_to_store_range() {
        let page = Pagination::from(HeroListParams {
            skip: Some(u64::MAX),
            limit: Some(10),
        });
        assert_eq!(page.skip, i64::MAX as u64);
        assert!(i64::try_from(page.skip).is_ok());
    }

    #[test]
    fn create_request_ignores_client_id() {
        let req: CreateHeroRequest = serde_json::from_str(
            r#"{"_id":"65a1f0c2e4b0a1b2c3d4e5f6","name":"Deadpond","secret_name":"Dive Wilson"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(NewHero::from(req).age, None);
    }

    #[test]
    fn response_serializes_id_as_hex_string() {
        let hero = Hero {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap(),
            name: "Deadpond".to_string(),
            secret_name: "Dive Wilson".to_string(),
            age: Some(30),
        };
        let json = serde_json::to_value(HeroResponse::from(hero)).unwrap();
        assert_eq!(json["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(json["age"], 30);
    }
}
