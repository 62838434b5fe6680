use crate::dtos::{
    CreateHeroRequest, DeleteHeroResponse, HeroListParams, HeroResponse, Pagination,
    UpdateHeroRequest,
};
use crate::models::{Hero, HeroId, NewHero};
use crate::services::metrics::{record_hero_created, record_hero_deleted, record_hero_updated};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use futures::stream::TryStreamExt;
use service_core::error::AppError;
use service_core::utils::validation::json_rejection_to_error;
use service_core::utils::ValidatedJson;

fn hero_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Hero not found"))
}

fn parse_hero_id(raw: &str) -> Result<HeroId, AppError> {
    raw.parse::<HeroId>().map_err(|e| {
        tracing::debug!(hero_id = %raw, "Rejected malformed hero id");
        AppError::from(e)
    })
}

/// A PATCH without a JSON body is missing a required input, not malformed.
fn update_body_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::UnprocessableEntity(anyhow::anyhow!("Request body is required"))
        }
        other => json_rejection_to_error(other),
    }
}

pub async fn create_hero(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateHeroRequest>,
) -> Result<Json<HeroResponse>, AppError> {
    let new_hero = NewHero::from(req);
    let id = state.store.insert_one(new_hero.clone()).await.map_err(|e| {
        tracing::error!("Failed to insert hero: {}", e);
        e
    })?;

    record_hero_created();
    tracing::info!(hero_id = %id, "Hero created");

    Ok(Json(HeroResponse::from(Hero::from_new(id, new_hero))))
}

pub async fn list_heroes(
    State(state): State<AppState>,
    Query(params): Query<HeroListParams>,
) -> Result<Json<Vec<HeroResponse>>, AppError> {
    let page = Pagination::from(params);

    let heroes: Vec<HeroResponse> = state
        .store
        .find(page)
        .await?
        .map_ok(HeroResponse::from)
        .try_collect()
        .await?;

    tracing::debug!(
        skip = page.skip,
        limit = page.limit,
        returned = heroes.len(),
        "Listed heroes"
    );

    Ok(Json(heroes))
}

pub async fn get_hero(
    State(state): State<AppState>,
    Path(hero_id): Path<String>,
) -> Result<Json<HeroResponse>, AppError> {
    let id = parse_hero_id(&hero_id)?;

    let hero = state
        .store
        .find_one(&id)
        .await?
        .ok_or_else(hero_not_found)?;

    Ok(Json(HeroResponse::from(hero)))
}

pub async fn update_hero(
    State(state): State<AppState>,
    Path(hero_id): Path<String>,
    body: Result<Json<UpdateHeroRequest>, JsonRejection>,
) -> Result<Json<HeroResponse>, AppError> {
    // The id is checked before the body so a bad id is always a 400.
    let id = parse_hero_id(&hero_id)?;
    let Json(req) = body.map_err(update_body_rejection)?;
    let changes = req.into_changes()?;

    if !changes.is_empty() {
        tracing::info!(
            hero_id = %id,
            fields = ?changes.fields().collect::<Vec<_>>(),
            "Updating hero"
        );

        let matched = state.store.update_one(&id, changes).await.map_err(|e| {
            tracing::error!(hero_id = %id, "Failed to update hero: {}", e);
            e
        })?;
        if matched == 0 {
            return Err(hero_not_found());
        }
        record_hero_updated();
    }

    // Always re-read: a no-op update still reports 404 for a missing hero.
    let hero = state
        .store
        .find_one(&id)
        .await?
        .ok_or_else(hero_not_found)?;

    Ok(Json(HeroResponse::from(hero)))
}

pub async fn delete_hero(
    State(state): State<AppState>,
    Path(hero_id): Path<String>,
) -> Result<Json<DeleteHeroResponse>, AppError> {
    let id = parse_hero_id(&hero_id)?;

    let deleted = state.store.delete_one(&id).await.map_err(|e| {
        tracing::error!(hero_id = %id, "Failed to delete hero: {}", e);
        e
    })?;
    if deleted == 0 {
        return Err(hero_not_found());
    }

    record_hero_deleted();
    tracing::info!(hero_id = %id, "Hero deleted");

    Ok(Json(DeleteHeroResponse { ok: true }))
}
