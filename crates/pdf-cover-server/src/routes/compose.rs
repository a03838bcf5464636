use axum::{Json, extract::State};
use pdf_cover::{CoverPlacement, MergeRequest, merge_to_bytes};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;

/// Merge request for a previously uploaded file. Page numbers are
/// zero-based.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    pub file_id: String,
    #[serde(default)]
    pub selected_pages: Vec<usize>,
    pub cover_page: Option<usize>,
    pub cover_placement: Option<String>,
    #[serde(default = "default_export_format")]
    pub export_format: String,
}

fn default_export_format() -> String {
    "pdf".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
    pub download_url: String,
    pub filename: String,
}

#[tracing::instrument(skip_all)]
pub async fn compose_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ComposeRequest>,
) -> ServiceResult<Json<ComposeResponse>> {
    if !request.export_format.eq_ignore_ascii_case("pdf") {
        return Err(ServiceError::invalid(format!(
            "Export format '{}' is not supported for merges; use 'pdf'",
            request.export_format
        )));
    }

    let file_id = Uuid::parse_str(&request.file_id)
        .map_err(|_| ServiceError::invalid(format!("Malformed file id '{}'", request.file_id)))?;
    let placement = match request.cover_placement.as_deref() {
        Some(placement) => placement.parse::<CoverPlacement>()?,
        None => CoverPlacement::default(),
    };

    let mut merge_request = MergeRequest::new(request.selected_pages);
    if let Some(cover) = request.cover_page {
        merge_request = merge_request.with_cover(cover, placement);
    }

    let path = state.upload_path(&file_id);
    let source = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::FileNotFound {
                file_id: request.file_id,
            });
        }
        Err(err) => return Err(err.into()),
    };

    let merged =
        tokio::task::spawn_blocking(move || merge_to_bytes(&source, &merge_request)).await??;

    let filename = format!("composition_{}.pdf", Uuid::new_v4());
    tokio::fs::create_dir_all(&state.config.storage.output_dir).await?;
    tokio::fs::write(state.output_path(&filename), &merged).await?;
    tracing::info!(%file_id, %filename, bytes = merged.len(), "Wrote merged document");

    Ok(Json(ComposeResponse {
        download_url: format!("/api/download/{}", filename),
        filename,
    }))
}
