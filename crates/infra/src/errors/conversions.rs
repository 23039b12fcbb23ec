//! Conversions from external infrastructure errors into domain errors.

use influlink_common::OAuthClientError;
use influlink_domain::InfluLinkError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub InfluLinkError);

impl From<InfraError> for InfluLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<InfluLinkError> for InfraError {
    fn from(value: InfluLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoInfluLinkError {
    fn into_influlink(self) -> InfluLinkError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → InfluLinkError */
/* -------------------------------------------------------------------------- */

impl IntoInfluLinkError for SqlError {
    fn into_influlink(self) -> InfluLinkError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        InfluLinkError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        InfluLinkError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        InfluLinkError::Conflict("unique constraint violation".into())
                    }
                    (ErrorCode::NotADatabase, _) => {
                        InfluLinkError::Database("file is not a database".into())
                    }
                    _ => InfluLinkError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => InfluLinkError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                InfluLinkError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                InfluLinkError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                InfluLinkError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => InfluLinkError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => InfluLinkError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_influlink())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → InfluLinkError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(InfluLinkError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → InfluLinkError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(InfluLinkError::Database(format!("corrupt influencer document: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → InfluLinkError */
/* -------------------------------------------------------------------------- */

impl IntoInfluLinkError for HttpError {
    fn into_influlink(self) -> InfluLinkError {
        if self.is_timeout() {
            return InfluLinkError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return InfluLinkError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => InfluLinkError::Auth(message),
                404 => InfluLinkError::NotFound(message),
                400..=499 if code != 429 => InfluLinkError::InvalidInput(message),
                _ => InfluLinkError::Network(message),
            };
        }

        if self.is_decode() {
            return InfluLinkError::Network(format!("invalid HTTP response body: {self}"));
        }

        InfluLinkError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_influlink())
    }
}

/* -------------------------------------------------------------------------- */
/* OAuthClientError → InfluLinkError */
/* -------------------------------------------------------------------------- */

impl From<OAuthClientError> for InfraError {
    fn from(value: OAuthClientError) -> Self {
        let error = match value {
            OAuthClientError::RequestFailed(err) => {
                InfluLinkError::Auth(format!("token endpoint unreachable: {}", err.into_influlink()))
            }
            OAuthClientError::ConfigError(msg) => InfluLinkError::Config(msg),
            other => InfluLinkError::Auth(other.to_string()),
        };
        InfraError(error)
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
