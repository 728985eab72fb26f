//! JSON body extractor with `validator` checks.
//!
//! A body that does not parse is a 400 with the parser's message. A body
//! that parses but fails validation is a 422 whose `data` maps each
//! offending field to its messages:
//!
//! ```json
//! {"success": false, "data": {"latitude": ["range"]}, "error": "1 invalid field"}
//! ```

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

/// Field name to the messages reported for it, in field order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// `Json<T>` that also runs `T::validate()`.
pub struct ValidatedJson<T>(pub T);

/// Why a request body was refused.
pub enum BodyRejection {
    Malformed(JsonRejection),
    Invalid(ValidationErrors),
}

impl BodyRejection {
    fn status(&self) -> StatusCode {
        match self {
            Self::Malformed(_) => StatusCode::BAD_REQUEST,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Flatten `validator`'s per-field errors. A rule without a custom
/// message is reported by its code, e.g. `range`.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Malformed(rejection) => {
                ApiResponse::<FieldErrors>::error(format!("Invalid JSON: {}", rejection.body_text()))
            }
            Self::Invalid(errors) => {
                let fields = field_errors(&errors);
                let summary = match fields.len() {
                    1 => "1 invalid field".to_string(),
                    n => format!("{} invalid fields", n),
                };
                ApiResponse {
                    success: false,
                    data: Some(fields),
                    error: Some(summary),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(BodyRejection::Malformed)?;
        value.validate().map_err(BodyRejection::Invalid)?;
        Ok(Self(value))
    }
}
