use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{error::Result, services::ingest_service::IngestOutcome, AppState};

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// LINE webhook endpoint. The raw body is kept intact for signature checks.
pub async fn handle_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str)> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match state.ingest_service.handle_delivery(&body, signature).await? {
        IngestOutcome::UnknownDestination => {}
        IngestOutcome::Processed(report) if report.failed > 0 => {
            tracing::warn!(failed = report.failed, "webhook acknowledged with dropped events");
        }
        IngestOutcome::Processed(_) => {}
    }

    Ok((StatusCode::OK, "OK"))
}
