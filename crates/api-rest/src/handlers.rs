//! REST handlers.
//!
//! Store and image work is blocking filesystem or codec work, so every handler
//! moves it onto the blocking pool with [`run_blocking`].

use crate::error::ApiError;
use crate::AppState;
use api_shared::{
    BrowseItem, ErrorRes, HealthRes, HealthService, LastProjectRes, RenameReq, SuccessRes,
    UPLOAD_DUPLICATE_MESSAGE, UPLOAD_STORED_MESSAGE,
};
use axum::{
    extract::{Multipart, Path as AxumPath, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use qphotos_core::{BrowseEntry, IngestOutcome, UploadRequest};
use utoipa::ToSchema;

/// Multipart form of `POST /upload`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct UploadForm {
    /// Photo bytes
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    project_name: String,
    /// Client-generated identifier; becomes the file name
    uuid: String,
}

async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        tracing::error!("blocking task failed: {}", e);
        ApiError::Internal
    })?
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Multipart error: {e}"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo stored, or duplicate ignored", body = SuccessRes),
        (status = 400, description = "Missing uuid, file or project name", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Upload a photo from the mobile client
///
/// The photo is captioned with the project and the server time and stored
/// under the current month, project and day. Uploading an identifier that is
/// already stored for the same day and project succeeds without changing it,
/// so clients can retry freely.
///
/// # Errors
/// Returns `400 Bad Request` if a required form field is missing or unusable,
/// and `500 Internal Server Error` if the photo cannot be decoded or stored.
#[axum::debug_handler]
pub(crate) async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SuccessRes>, ApiError> {
    let mut request = UploadRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("file") => {
                request.file = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            Some("project_name") => {
                request.project_name = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("uuid") => {
                request.photo_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let upload = request.validate()?;
    let received_at = Local::now().naive_local();
    let store = state.store.clone();
    let outcome = run_blocking(move || Ok(store.ingest(upload, received_at)?)).await?;

    let message = match outcome {
        IngestOutcome::Stored { .. } => UPLOAD_STORED_MESSAGE,
        IngestOutcome::DuplicateIgnored { .. } => UPLOAD_DUPLICATE_MESSAGE,
    };
    Ok(Json(SuccessRes::new(message)))
}

#[utoipa::path(
    put,
    path = "/project/{path}",
    request_body = RenameReq,
    responses(
        (status = 200, description = "Folder renamed", body = SuccessRes),
        (status = 400, description = "Missing or invalid new name", body = ErrorRes),
        (status = 403, description = "Path outside the storage root", body = ErrorRes),
        (status = 404, description = "Folder not found", body = ErrorRes),
        (status = 409, description = "A folder with the new name already exists", body = ErrorRes)
    )
)]
/// Rename a project folder (or any entry) in place
#[axum::debug_handler]
pub(crate) async fn rename_project(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    Json(req): Json<RenameReq>,
) -> Result<Json<SuccessRes>, ApiError> {
    let store = state.store.clone();
    run_blocking(move || Ok(store.rename(&path, &req.new_name)?)).await?;
    Ok(Json(SuccessRes::new("Project renamed")))
}

#[utoipa::path(
    delete,
    path = "/project/{path}",
    responses(
        (status = 200, description = "Folder deleted with its contents", body = SuccessRes),
        (status = 403, description = "Path outside the storage root", body = ErrorRes),
        (status = 404, description = "Folder not found", body = ErrorRes)
    )
)]
/// Delete a project folder recursively
#[axum::debug_handler]
pub(crate) async fn delete_project(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Json<SuccessRes>, ApiError> {
    let store = state.store.clone();
    let target = path.clone();
    run_blocking(move || Ok(store.delete(&target)?)).await?;
    Ok(Json(SuccessRes::new(format!("Project '{path}' deleted."))))
}

#[utoipa::path(
    delete,
    path = "/photo/{path}",
    responses(
        (status = 200, description = "Photo deleted", body = SuccessRes),
        (status = 400, description = "Path is a folder", body = ErrorRes),
        (status = 403, description = "Path outside the storage root", body = ErrorRes),
        (status = 404, description = "Photo not found", body = ErrorRes)
    )
)]
/// Delete a single photo
#[axum::debug_handler]
pub(crate) async fn delete_photo(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Json<SuccessRes>, ApiError> {
    let store = state.store.clone();
    let target = path.clone();
    run_blocking(move || Ok(store.delete_photo(&target)?)).await?;
    Ok(Json(SuccessRes::new(format!("Photo '{path}' deleted."))))
}

#[utoipa::path(
    get,
    path = "/last-project",
    responses(
        (status = 200, description = "Project of the latest upload, empty if none", body = LastProjectRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Project name of the latest stored upload
#[axum::debug_handler]
pub(crate) async fn last_project(
    State(state): State<AppState>,
) -> Result<Json<LastProjectRes>, ApiError> {
    let store = state.store.clone();
    let last_project = run_blocking(move || Ok(store.last_project()?)).await?;
    Ok(Json(LastProjectRes {
        last_project: last_project.unwrap_or_default(),
    }))
}

#[utoipa::path(
    get,
    path = "/projects_current_month",
    responses(
        (status = 200, description = "Project names of the current month, sorted", body = Vec<String>),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Projects that already have photos this month
///
/// Lets the mobile client offer existing project names.
#[axum::debug_handler]
pub(crate) async fn projects_current_month(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let store = state.store.clone();
    let now = Local::now().naive_local();
    let projects = run_blocking(move || Ok(store.projects_in_month(now)?)).await?;
    Ok(Json(projects))
}

fn browse_item(entry: BrowseEntry) -> BrowseItem {
    BrowseItem {
        name: entry.name,
        path: entry.path,
        kind: entry.kind.as_str().to_owned(),
    }
}

async fn browse_at(state: AppState, path: String) -> Result<Json<Vec<BrowseItem>>, ApiError> {
    let store = state.store.clone();
    let entries = run_blocking(move || Ok(store.browse(&path)?)).await?;
    Ok(Json(entries.into_iter().map(browse_item).collect()))
}

#[utoipa::path(
    get,
    path = "/browse/",
    responses(
        (status = 200, description = "Month folders, newest first", body = Vec<BrowseItem>)
    )
)]
/// List the month folders at the storage root
#[axum::debug_handler]
pub(crate) async fn browse_root(
    State(state): State<AppState>,
) -> Result<Json<Vec<BrowseItem>>, ApiError> {
    browse_at(state, String::new()).await
}

#[utoipa::path(
    get,
    path = "/browse/{path}",
    responses(
        (status = 200, description = "Children of the folder", body = Vec<BrowseItem>),
        (status = 403, description = "Path outside the storage root", body = ErrorRes),
        (status = 404, description = "Folder not found", body = ErrorRes)
    )
)]
/// List the children of a folder, classified as month, project, day or photo
#[axum::debug_handler]
pub(crate) async fn browse_path(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Json<Vec<BrowseItem>>, ApiError> {
    browse_at(state, path).await
}

#[utoipa::path(
    get,
    path = "/uploads/{path}",
    responses(
        (status = 200, description = "Stored file as is"),
        (status = 403, description = "Path outside the storage root", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes)
    )
)]
/// Serve a stored photo at full resolution
#[axum::debug_handler]
pub(crate) async fn serve_upload(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response, ApiError> {
    let store = state.store.clone();
    let stored = run_blocking(move || Ok(store.read_file(&path)?)).await?;
    Ok(([(header::CONTENT_TYPE, stored.media_type)], stored.bytes).into_response())
}

#[utoipa::path(
    get,
    path = "/thumbnail/{path}",
    responses(
        (status = 200, description = "JPEG thumbnail, at most 400 px on its longest side"),
        (status = 403, description = "Path outside the storage root", body = ErrorRes),
        (status = 404, description = "Photo not found", body = ErrorRes),
        (status = 500, description = "Stored file is not an image", body = ErrorRes)
    )
)]
/// Serve a thumbnail of a stored photo, rendered on the fly
#[axum::debug_handler]
pub(crate) async fn serve_thumbnail(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response, ApiError> {
    let thumbnails = state.thumbnails.clone();
    let jpeg = run_blocking(move || Ok(thumbnails.render(&path)?)).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response())
}
