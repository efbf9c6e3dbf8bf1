use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::utils;

use super::data::DataParsingError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),

    #[error("database connection parameters are not configured")]
    DbNotConfigured,

    #[error("failed to read the request payload: {0}")]
    PayloadRejection(String),

    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        utils::error_chain_fmt(self, f)
    }
}

impl Error {
    /// Maps a server-side error to the status code and the client-facing error
    /// the response mapper sends out.
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::DataParsing(DataParsingError::EmailMissing) => {
                (StatusCode::BAD_REQUEST, Validation("Email is required"))
            }
            Error::DataParsing(DataParsingError::EmailInvalid) => {
                (StatusCode::BAD_REQUEST, Validation("Invalid email format"))
            }
            Error::DbNotConfigured => (StatusCode::INTERNAL_SERVER_ERROR, Configuration),
            Error::Sqlx(_) => (StatusCode::INTERNAL_SERVER_ERROR, Storage),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, Internal),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// The error vocabulary callers see. One fixed message per kind; backend
/// detail never crosses this line.
#[derive(Debug, Clone, Copy, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    Validation(&'static str),
    #[display("Server configuration error")]
    Configuration,
    #[display("Failed to join waitlist")]
    Storage,
    #[display("Internal server error")]
    Internal,
}
