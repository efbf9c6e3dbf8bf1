use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::web::{log, Error};

/// Rewrites responses whose handler stored an [`Error`] in the extensions:
/// the caller gets the fixed `{"error": ...}` vocabulary and the real status
/// code, while the server error only ever reaches the request log.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    let uuid = Uuid::new_v4();

    let web_error = resp.extensions().get::<Arc<Error>>().map(|er| er.as_ref());
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let mapped_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let body = json!({ "error": cl_err.to_string() });
        (*status, Json(body)).into_response()
    });

    let _ = log::log_request(
        uuid,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error,
    )
    .await;

    mapped_resp.unwrap_or(resp)
}
