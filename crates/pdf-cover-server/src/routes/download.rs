use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;

/// A bare file name: no separators, no parent references
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains(['/', '\\', '\0'])
        && !filename.contains("..")
}

#[tracing::instrument(skip_all)]
pub async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ServiceResult<impl IntoResponse> {
    if !is_safe_filename(&filename) {
        return Err(ServiceError::invalid("Invalid file name"));
    }

    let bytes = match tokio::fs::read(state.output_path(&filename)).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::FileNotFound { file_id: filename });
        }
        Err(err) => return Err(err.into()),
    };

    let content_type = if filename.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_rejected() {
        assert!(is_safe_filename("composition_1.pdf"));
        assert!(!is_safe_filename("../config.toml"));
        assert!(!is_safe_filename("..\\secret"));
        assert!(!is_safe_filename("nested/file.pdf"));
        assert!(!is_safe_filename(""));
    }
}
