// ABOUTME: Knowledge-base file management beyond uploads.
// ABOUTME: Removes previously uploaded files and lists what the backend has indexed.

use std::path::Path;

use aab_proto::{GetFileListRequest, RemoveFilesRequest};

use crate::backend::Middleware;
use crate::error::ClientError;
use crate::transfer::{paths_json, resolve_existing_paths, TransferObserver};

/// Error marker in RemoveFiles status text.
pub const REMOVE_ERROR_MARKER: &str = "Error";

/// Remove files from the knowledge base.
///
/// Paths go through the same validation as uploads. Returns `None` when no
/// valid path remained and no call was made, otherwise the server's status.
pub async fn remove_files<M, P, O>(
    backend: &M,
    paths: &[P],
    observer: &mut O,
) -> Result<Option<String>, ClientError>
where
    M: Middleware + ?Sized,
    P: AsRef<Path>,
    O: TransferObserver + ?Sized,
{
    let valid = resolve_existing_paths(paths, observer);
    if valid.is_empty() {
        tracing::info!("no valid file paths to remove");
        return Ok(None);
    }

    let request = RemoveFilesRequest {
        files_to_remove: paths_json(&valid)?,
    };
    let response = backend
        .remove_files(request)
        .await
        .map_err(ClientError::transfer)?;
    if response.files_removed.contains(REMOVE_ERROR_MARKER) {
        return Err(ClientError::Transfer(response.files_removed));
    }
    tracing::info!(removed = %response.files_removed, "files removed");
    Ok(Some(response.files_removed))
}

/// List files indexed in the knowledge base.
pub async fn list_files<M>(backend: &M) -> Result<Vec<serde_json::Value>, ClientError>
where
    M: Middleware + ?Sized,
{
    let response = backend
        .get_file_list(GetFileListRequest {
            file_type: String::new(),
        })
        .await
        .map_err(ClientError::rpc("GetFileList"))?;
    serde_json::from_str(&response.file_list)
        .map_err(|e| ClientError::Protocol(format!("file list: {e}")))
}
