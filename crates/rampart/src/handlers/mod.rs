//! http handlers for rampart api endpoints.

pub mod api_v1;
mod error;
mod health;

pub use error::{ApiError, OptionExt, ResultExt};
pub use health::health;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

/// json body extractor that reports rejections as 400 with the parse
/// error in the body instead of axum's default plain rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}
