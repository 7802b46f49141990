//! Gallery route handlers
//!
//! Listing, upload, streaming, and deletion of a user's images. Every route
//! here requires a session and consults it before any other work.

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;
use log::warn;
use tokio_util::io::ReaderStream;

use crate::auth::session;
use crate::db::UserId;
use crate::error::{AccessError, StorageError, UploadError};
use crate::gallery::orchestrator;
use crate::handlers::{internal_error, pages};
use crate::server::AppState;
use crate::storage::content_type_for;

/// GET /images - the caller's images, newest first.
pub async fn gallery(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    // 1. Authentication check
    let Some(user_id) = session::current(&jar) else {
        return Redirect::to("/login").into_response();
    };

    render_gallery(&state, user_id, None)
}

/// POST /images/upload - multipart upload of a single `image` field.
pub async fn upload(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut multipart: Multipart,
) -> Response {
    // 1. Authentication check
    let Some(user_id) = session::current(&jar) else {
        return Redirect::to("/login").into_response();
    };

    // 2. Pull the file field out of the multipart body
    let (declared_name, data) = match read_image_field(&mut multipart).await {
        Ok(Some(field)) => field,
        Ok(None) => return render_gallery(&state, user_id, Some("No file selected.")),
        Err(response) => return response,
    };
    if declared_name.is_empty() || data.is_empty() {
        return render_gallery(&state, user_id, Some("No file selected."));
    }

    // 3. Hand off to the upload sequence: validate, allocate, write, commit
    match orchestrator::store_upload(&state.db, &state.upload_root, user_id, &declared_name, &data)
    {
        Ok(_) => Redirect::to("/images").into_response(),
        Err(UploadError::Storage(StorageError::InvalidFileType(_))) => {
            render_gallery(&state, user_id, Some("File type not allowed."))
        }
        Err(e) => {
            warn!("Upload failed for user {}: {}", user_id, e);
            render_gallery(&state, user_id, Some("Upload failed. Please try again."))
        }
    }
}

/// GET /images/{id}/file - stream the stored bytes to the owner.
pub async fn image_file(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(image_id): Path<i64>,
) -> Response {
    // 1. Authentication check
    let Some(user_id) = session::current(&jar) else {
        return Redirect::to("/login").into_response();
    };

    // 2. Fetch and enforce ownership
    let record = match orchestrator::fetch_owned(&state.db, image_id, user_id) {
        Ok(record) => record,
        Err(e) => return access_error_response(e),
    };

    // 3. Stream the file from its stored path
    let file = match tokio::fs::File::open(&record.stored_path).await {
        Ok(file) => file,
        Err(e) => {
            // A row without its backing file should never occur
            return internal_error(
                &format!("missing backing file for image {}", record.id),
                &e,
            );
        }
    };

    let extension = record
        .stored_filename
        .rsplit_once('.')
        .map(|(_, suffix)| suffix)
        .unwrap_or("");
    let stream = ReaderStream::new(file);

    (
        [(header::CONTENT_TYPE, content_type_for(extension))],
        Body::from_stream(stream),
    )
        .into_response()
}

/// POST /images/{id}/delete
pub async fn delete_image(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(image_id): Path<i64>,
) -> Response {
    // 1. Authentication check
    let Some(user_id) = session::current(&jar) else {
        return Redirect::to("/login").into_response();
    };

    // 2. Row first, then best-effort unlink
    match orchestrator::remove_image(&state.db, image_id, user_id) {
        Ok(()) => Redirect::to("/images").into_response(),
        // Already gone: benign, land back on the gallery
        Err(AccessError::NotFound(_)) => Redirect::to("/images").into_response(),
        Err(e) => access_error_response(e),
    }
}

fn render_gallery(state: &AppState, user_id: UserId, notice: Option<&str>) -> Response {
    match state.db.images_by_owner(user_id) {
        Ok(images) => pages::gallery_page(&images, notice).into_response(),
        Err(e) => internal_error("image listing failed", &e),
    }
}

/// Find the `image` field and read it fully; `Ok(None)` when the form had no
/// such field. Malformed or oversized bodies answer 400 directly.
async fn read_image_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Bytes)>, Response> {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("image") => {
                let declared_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e))
                        .into_response()
                })?;
                return Ok(Some((declared_name, data)));
            }
            Ok(Some(_)) => continue,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(
                    (StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e))
                        .into_response(),
                );
            }
        }
    }
}

/// Same user-facing text for "not found" and "not yours": the response body
/// must not reveal whether another user's image exists.
fn access_error_response(err: AccessError) -> Response {
    match err {
        AccessError::NotFound(_) => (StatusCode::NOT_FOUND, "Image not found.").into_response(),
        AccessError::Forbidden(id) => {
            warn!("Blocked access to image {} by a non-owner", id);
            (StatusCode::FORBIDDEN, "Image not found.").into_response()
        }
        AccessError::Db(e) => internal_error("image lookup failed", &e),
    }
}
