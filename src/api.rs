use std::convert::Infallible;

use axum::{
    Form, Json, async_trait,
    extract::{FromRequest, Request},
    http::header,
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default, deserialize_with = "scalar_text")]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default, deserialize_with = "scalar_text")]
    pub comment: Option<String>,
}

/// Reads a text field that clients may send as any JSON scalar. Numbers and
/// `true` become their text form; `null`, `false`, `0` and structured values
/// count as absent.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some("true".to_string()),
        _ => None,
    })
}

/// Non-empty value of an optional body field.
pub fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

/// Request body read as JSON or as a urlencoded form, depending on the
/// content type. Anything else, including a body that fails to parse,
/// yields `T::default()` so handlers can answer with their own message.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let parsed = if content_type.starts_with("application/json") {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(v)| v)
                .map_err(|e| e.body_text())
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(v)| v)
                .map_err(|e| e.body_text())
        } else {
            Ok(T::default())
        };

        Ok(Payload(parsed.unwrap_or_else(|e| {
            tracing::debug!(error = %e, "unreadable request body, treating as empty");
            T::default()
        })))
    }
}
