use std::path::PathBuf;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum_extra::extract::cookie::CookieJar;
use common::pdf::extract_text_blocking;
use common::storage::{StorageError, StoredUpload};
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::form::AppForm;
use crate::flash::{self, Flash};
use crate::models::file::FileIdParams;
use crate::repo;
use crate::state::AppState;
use crate::utils::filename::{has_pdf_extension, secure_filename};
use crate::views;

/// Multipart field carrying the PDF.
pub const FILE_FIELD: &str = "pdf_file";

/// Room for multipart framing on top of the file size limit.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// List the current user's files.
#[instrument(skip(state, auth_user, jar), fields(user_id = auth_user.user_id))]
pub async fn dashboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let files = repo::find_files_by_user(&state.db, auth_user.user_id).await?;

    let (jar, flashes) = flash::take(jar);
    Ok((jar, views::dashboard(&auth_user, &flashes, &files)))
}

pub async fn upload_form(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let (jar, flashes) = flash::take(jar);
    let max_size = state.uploads.max_size();
    (jar, views::upload(&auth_user, &flashes, max_size))
}

/// Accept a PDF upload, store it, extract its text and record it.
///
/// Checks run in order: a file was sent, its extension is `pdf`, its name
/// survives sanitising, it fits the size limit. Any failure redirects back to
/// the form and leaves neither a row nor a file behind.
#[instrument(skip(state, auth_user, jar, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(CookieJar, Redirect), AppError> {
    let mut received: Option<(String, StoredUpload)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue; // Ignore unknown fields.
        }
        received = Some(receive_pdf(&state, field).await?);
        break;
    }

    let (filename, stored) = received.ok_or_else(|| rejected("No file selected."))?;

    // NOTE: the file is already on disk; a failed insert below leaves it there.
    let text = extract_text_blocking(stored.path.clone()).await;
    let extracted = (!text.is_empty()).then_some(text.as_str());

    let file = repo::create_file(
        &state.db,
        auth_user.user_id,
        &filename,
        &stored.path.to_string_lossy(),
        extracted,
    )
    .await?;
    info!(file_id = file.id, size = stored.size, filename = %filename, "PDF uploaded");

    let jar = flash::push(
        jar,
        Flash::success("File uploaded and processed successfully!"),
    );
    Ok((jar, Redirect::to("/dashboard")))
}

async fn receive_pdf(
    state: &AppState,
    mut field: Field<'_>,
) -> Result<(String, StoredUpload), AppError> {
    let original = field
        .file_name()
        .map(str::to_owned)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| rejected("No file selected."))?;

    if !has_pdf_extension(&original) {
        return Err(rejected("Invalid file type! Only PDF files are allowed."));
    }

    let filename = secure_filename(&original).ok_or_else(|| rejected("Invalid filename."))?;

    let mut staged = state
        .uploads
        .stage(&filename)
        .await
        .map_err(|e| storage_error(state, e))?;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if let Err(e) = staged.write_chunk(&chunk).await {
            drop(staged);
            drain(&mut field).await;
            return Err(storage_error(state, e));
        }
    }

    let stored = staged.commit().await.map_err(|e| storage_error(state, e))?;
    Ok((filename, stored))
}

/// Read and discard the rest of an over-limit field so the client can finish sending.
async fn drain(field: &mut Field<'_>) {
    while let Ok(Some(_)) = field.chunk().await {}
}

fn rejected(message: impl Into<String>) -> AppError {
    AppError::validation(message, "/upload")
}

fn too_large(max_size: u64) -> AppError {
    rejected(format!(
        "File is too large! Maximum size allowed is {}MB.",
        max_size / (1024 * 1024)
    ))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload rejected by body limit");
        rejected("File is too large!")
    } else {
        rejected(format!("Upload failed: {}", err.body_text()))
    }
}

fn storage_error(state: &AppState, err: StorageError) -> AppError {
    match err {
        StorageError::SizeLimitExceeded { actual, limit } => {
            warn!(actual, limit, "Upload rejected: too large");
            too_large(state.uploads.max_size())
        }
        StorageError::InvalidFilename(_) => rejected("Invalid filename."),
        StorageError::Io(e) => AppError::Internal(format!("Upload write failed: {e}")),
    }
}

/// Show a file's text, extracting and caching it first if it was never stored.
///
/// The id comes from the query string on GET and the form body on POST. A
/// file that does not exist and one owned by someone else get the same answer.
#[instrument(skip(state, auth_user, jar, params), fields(user_id = auth_user.user_id))]
pub async fn extract_text(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
    AppForm(params): AppForm<FileIdParams>,
) -> Result<(CookieJar, Html<String>), AppError> {
    let raw_id = params
        .raw_id()
        .ok_or_else(|| AppError::validation("No file ID provided.", "/dashboard"))?;

    let file = match raw_id.parse::<i32>() {
        Ok(id) => repo::find_file_by_id(&state.db, id).await?,
        Err(_) => None,
    };
    let file = file
        .filter(|f| f.user_id == auth_user.user_id)
        .ok_or_else(|| {
            warn!(file_id = raw_id, "Text requested for a missing or foreign file");
            AppError::AccessDenied("Invalid file.".into())
        })?;

    // NULL means never extracted since upload; anything stored, even "", is final.
    let text = match file.extracted_text.as_deref() {
        Some(text) => text.to_owned(),
        None => {
            let text = extract_text_blocking(PathBuf::from(&file.file_path)).await;
            repo::update_file_text(&state.db, file.id, &text).await?;
            info!(file_id = file.id, "Extracted text cached");
            text
        }
    };

    let (jar, mut flashes) = flash::take(jar);
    flashes.push(Flash::success("Text extracted successfully!"));
    Ok((jar, views::extracted_text(&auth_user, &flashes, &file, &text)))
}
