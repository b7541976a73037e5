use anyhow::Context;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::info;

use crate::batch::{process_table, sheet};
use crate::errors::AppError;
use crate::state::AppState;

pub const OUTPUT_FILE_NAME: &str = "processed_file.xlsx";
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Bytes of the multipart field named `file`.
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            return Ok(field.bytes().await?);
        }
    }
    Err(AppError::Validation("No file uploaded".to_string()))
}

/// POST /upload
///
/// Drafts a document per spreadsheet row, keeps a copy under the batch output
/// directory and returns the augmented workbook as a download.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart).await?;
    let table = sheet::read_table(&upload)?;
    info!("Batch upload: {} rows", table.rows.len());

    let processed = process_table(state.llm.as_ref(), table).await?;
    let bytes = sheet::write_table(&processed)?;

    let dir = &state.config.batch_output_dir;
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(OUTPUT_FILE_NAME);
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Saved processed workbook to {}", path.display());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{OUTPUT_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
