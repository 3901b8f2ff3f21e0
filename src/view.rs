//! Controller outcomes: a named view with its model, or a redirect.
//!
//! Views render as `{"view": name, "model": {...}}` with the view's status.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    View {
        name: &'static str,
        status: StatusCode,
        model: Map<String, Value>,
    },
    Redirect(String),
}

impl Reply {
    pub fn view(name: &'static str) -> Self {
        Reply::View {
            name,
            status: StatusCode::OK,
            model: Map::new(),
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Reply::Redirect(location.into())
    }

    /// Add a model attribute. A value that fails to serialize is logged and
    /// stored as `null`.
    pub fn with(mut self, key: &str, value: impl serde::Serialize) -> Self {
        if let Reply::View { name, model, .. } = &mut self {
            let value = match serde_json::to_value(value) {
                Ok(value) => value,
                Err(err) => {
                    warn!(view = %name, attribute = key, %err, "model attribute failed to serialize");
                    Value::Null
                }
            };
            model.insert(key.to_string(), value);
        }
        self
    }

    pub fn with_status(mut self, code: StatusCode) -> Self {
        if let Reply::View { status, .. } = &mut self {
            *status = code;
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Reply::View { status, .. } => *status,
            Reply::Redirect(_) => StatusCode::FOUND,
        }
    }

    pub fn view_name(&self) -> Option<&'static str> {
        match self {
            Reply::View { name, .. } => Some(*name),
            Reply::Redirect(_) => None,
        }
    }

    pub fn model(&self, key: &str) -> Option<&Value> {
        match self {
            Reply::View { model, .. } => model.get(key),
            Reply::Redirect(_) => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Reply::Redirect(location) => Some(location.as_str()),
            Reply::View { .. } => None,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::View {
                name,
                status,
                model,
            } => (status, Json(json!({ "view": name, "model": model }))).into_response(),
            Reply::Redirect(location) => {
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
        }
    }
}
