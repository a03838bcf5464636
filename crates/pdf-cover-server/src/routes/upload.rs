//! PDF upload
//!
//! The file is checked twice: the declared MIME type and the `%PDF-` magic
//! bytes must both match. Accepted files are stored under a fresh id and
//! answered with the page count and a thumbnail per page.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pdf_cover::export::encode_image;
use pdf_cover::{DocumentInfo, ImageEncoding, render_thumbnail};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::state::{AppState, RasterizerFactory};

const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
    pub page_count: usize,
    /// One `data:image/png;base64,...` URL per page
    pub thumbnails: Vec<String>,
}

#[tracing::instrument(skip_all)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ServiceResult<Json<UploadResponse>> {
    let max = state.config.limits.max_upload_bytes;
    let mut upload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        if field.name() != Some("pdf") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        if content_type != PDF_MIME {
            return Err(ServiceError::UnsupportedFormat {
                format: if content_type.is_empty() {
                    "unknown".to_string()
                } else {
                    content_type
                },
            });
        }

        let data = field.bytes().await.map_err(|e| multipart_error(e, max))?;
        upload = Some(data.to_vec());
    }

    let data = upload.ok_or_else(|| ServiceError::invalid("No `pdf` field in upload"))?;
    if data.len() > max {
        return Err(ServiceError::FileTooLarge { max });
    }
    if !data.starts_with(PDF_MAGIC) {
        return Err(ServiceError::UnsupportedFormat {
            format: "file does not start with %PDF-".to_string(),
        });
    }

    let size = data.len();
    let file_id = Uuid::new_v4();
    let path = state.upload_path(&file_id);
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&path, &data).await?;

    let factory = state.rasterizer().cloned();
    let width = state.config.limits.thumbnail_width;
    let inspected = tokio::task::spawn_blocking(move || inspect_upload(data, factory, width)).await?;
    let (page_count, thumbnails) = match inspected {
        Ok(inspected) => inspected,
        Err(err) => {
            // Unreadable uploads are not kept
            let _ = tokio::fs::remove_file(&path).await;
            return Err(err);
        }
    };

    tracing::info!(%file_id, page_count, bytes = size, "Stored upload");

    Ok(Json(UploadResponse {
        file_id: file_id.to_string(),
        page_count,
        thumbnails,
    }))
}

fn multipart_error(err: MultipartError, max: usize) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::FileTooLarge { max }
    } else {
        ServiceError::invalid(err.body_text())
    }
}

/// Page count plus thumbnails; thumbnails are empty without a rasterizer
fn inspect_upload(
    data: Vec<u8>,
    factory: Option<RasterizerFactory>,
    width: u32,
) -> ServiceResult<(usize, Vec<String>)> {
    let info = DocumentInfo::from_bytes(&data).map_err(|e| ServiceError::UnsupportedFormat {
        format: format!("unreadable PDF: {e}"),
    })?;

    let Some(factory) = factory else {
        return Ok((info.page_count(), Vec::new()));
    };
    let rasterizer = match factory(data) {
        Ok(rasterizer) => rasterizer,
        Err(err) => {
            tracing::warn!(error = %err, "Thumbnails unavailable");
            return Ok((info.page_count(), Vec::new()));
        }
    };

    let mut thumbnails = Vec::with_capacity(info.page_count());
    for page in 0..info.page_count() {
        let (image, _) = render_thumbnail(rasterizer.as_ref(), page, width);
        let png = encode_image(&image, ImageEncoding::Png)?;
        thumbnails.push(format!("data:image/png;base64,{}", STANDARD.encode(png)));
    }
    Ok((info.page_count(), thumbnails))
}
