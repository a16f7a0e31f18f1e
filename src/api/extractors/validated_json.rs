//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// Validated JSON extractor that automatically validates requests.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use places_api::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct UpdatePlaceRequest {
///     #[validate(length(min = 1))]
///     title: String,
///     #[validate(length(min = 1))]
///     description: String,
/// }
///
/// async fn update_place(ValidatedJson(payload): ValidatedJson<UpdatePlaceRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation("Expected a JSON body with Content-Type: application/json")
        }
        other => AppError::validation(other.body_text()),
    }
}

/// Join field messages into one line, ordered by field name.
///
/// Fields without a custom message read as `"<field> is invalid"`.
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    #[derive(Deserialize, Validate)]
    struct Pair {
        #[validate(length(min = 1))]
        title: String,
        #[validate(length(min = 1, message = "Description is required"))]
        description: String,
    }

    #[test]
    fn test_format_orders_fields_and_falls_back() {
        let pair = Pair {
            title: String::new(),
            description: String::new(),
        };
        let errors = pair.validate().unwrap_err();
        assert_eq!(
            format_validation_errors(&errors),
            "Description is required, title is invalid"
        );
    }

    #[test]
    fn test_format_uses_field_messages() {
        let probe = Probe {
            title: String::new(),
        };
        let errors = probe.validate().unwrap_err();
        assert_eq!(format_validation_errors(&errors), "Title is required");
    }
}
