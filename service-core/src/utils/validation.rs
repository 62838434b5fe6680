use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body extractor that runs `validator` rules after deserializing.
///
/// Well-formed JSON with missing or mistyped fields and rule violations are
/// both rejected as 422; unparseable bodies are 400.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection_to_error)?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

pub fn json_rejection_to_error(rejection: JsonRejection) -> AppError {
    let message = anyhow::anyhow!(rejection.body_text());
    if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
        AppError::UnprocessableEntity(message)
    } else {
        AppError::BadRequest(message)
    }
}
