//! Request extractors shared by the controllers.

use std::convert::Infallible;

use axum::extract::{Form, FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{AppError, ROUTE_NOT_FOUND};
use crate::paging::PageRequest;
use crate::AppState;

/// Parse a path segment made only of ASCII digits.
pub fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Numeric id taken from a path segment; `+1`, `-1` or `1a` are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i64);

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_id(&raw)
            .map(EntityId)
            .ok_or_else(|| de::Error::custom(format!("`{}` is not a numeric id", raw)))
    }
}

#[derive(Debug, Deserialize)]
pub struct TicketPath {
    pub ticket: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct CommentPath {
    pub ticket: EntityId,
    pub comment: EntityId,
}

/// Path parameters whose malformed values answer 404, as an unmatched
/// route would, instead of axum's default 400.
pub struct PathIds<T>(pub T);

impl<S, T> FromRequestParts<S> for PathIds<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathIds(value)),
            Err(rejection) => {
                debug!(path = %parts.uri.path(), %rejection, "path does not address an entity");
                Err(AppError::NotFound(ROUTE_NOT_FOUND))
            }
        }
    }
}

/// A form submission that never rejects: an undecodable body is treated as
/// an empty form so that it fails validation like any blank submission.
pub struct Submitted<T>(pub T);

impl<S, T> FromRequest<S> for Submitted<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Submitted(value)),
            Err(rejection) => {
                debug!(%rejection, "form body rejected, treating as empty submission");
                Ok(Submitted(T::default()))
            }
        }
    }
}

/// Page request parsed leniently from the query string using the
/// configured paging limits.
pub struct Paged(pub PageRequest);

impl FromRequestParts<AppState> for Paged {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let pairs = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => pairs,
            Err(rejection) => {
                debug!(%rejection, "ignoring malformed paging query");
                Vec::new()
            }
        };
        Ok(Paged(state.paging.page_request(&pairs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1"), Some(1));
        assert_eq!(parse_id("100500"), Some(100500));
        assert_eq!(parse_id("007"), Some(7));
    }

    #[test]
    fn test_parse_id_rejects_non_digits() {
        for raw in ["", "+1", "-1", "1a", "abc", " 1", "1.0", "create"] {
            assert_eq!(parse_id(raw), None, "{:?}", raw);
        }
    }

    #[test]
    fn test_parse_id_rejects_overflow() {
        assert_eq!(parse_id("99999999999999999999"), None);
    }

    proptest! {
        #[test]
        fn prop_parse_id_roundtrip(id in 0i64..i64::MAX) {
            prop_assert_eq!(parse_id(&id.to_string()), Some(id));
        }

        #[test]
        fn prop_parse_id_never_panics(raw in "\\PC{0,24}") {
            let parsed = parse_id(&raw);
            if parsed.is_some() {
                prop_assert!(raw.bytes().all(|b| b.is_ascii_digit()));
            }
        }
    }
}
