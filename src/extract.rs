//! Request extractors whose rejections use the crate's JSON error shape.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `axum::Json` that rejects with [`ApiError`]: 422 for bodies missing
/// required fields or carrying wrong types, 400 for unparseable JSON.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// JSON body when the request declares a content type, query string otherwise.
///
/// Lets `POST /signup?username=..&password=..` keep working next to the JSON form.
#[derive(Debug)]
pub struct JsonOrQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonOrQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.headers().contains_key(CONTENT_TYPE) {
            let ApiJson(value) = ApiJson::<T>::from_request(req, state).await?;
            return Ok(Self(value));
        }

        let (mut parts, _body) = req.into_parts();
        let ApiQuery(value) = ApiQuery::<T>::from_request_parts(&mut parts, state).await?;
        Ok(Self(value))
    }
}
