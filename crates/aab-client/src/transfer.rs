// ABOUTME: Transfer progress client shared by knowledge-base upload and model download.
// ABOUTME: Maps stream events to monotonic progress, stops at 100 or on an in-band error marker.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use aab_grpc::ResponseStream;
use aab_proto::{AddFilesRequest, AddFilesResponse, DownloadFilesRequest, DownloadFilesResponse};
use futures::StreamExt;

use crate::backend::Middleware;
use crate::error::ClientError;

/// Percentage that ends a transfer successfully.
pub const COMPLETE_PERCENT: i32 = 100;

/// Error marker searched for in upload status text.
///
/// The two transfer paths use different casing. This is likely a latent
/// inconsistency on the server side; it is kept as-is until the server's
/// actual sentinel is confirmed.
pub const UPLOAD_ERROR_MARKER: &str = "ERROR";

/// Error marker searched for in download status text.
pub const DOWNLOAD_ERROR_MARKER: &str = "Error";

/// One element of a transfer stream.
pub trait ProgressEvent {
    /// Percent complete. Negative values are heartbeats.
    fn percent(&self) -> i32;
    /// Free-text status reported with the percentage.
    fn status(&self) -> &str;
}

impl ProgressEvent for AddFilesResponse {
    fn percent(&self) -> i32 {
        self.current_file_progress
    }

    fn status(&self) -> &str {
        &self.files_uploaded
    }
}

impl ProgressEvent for DownloadFilesResponse {
    fn percent(&self) -> i32 {
        self.progress
    }

    fn status(&self) -> &str {
        &self.file_downloaded
    }
}

/// Which transfer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Upload,
    Download,
}

impl TransferKind {
    pub fn error_marker(self) -> &'static str {
        match self {
            TransferKind::Upload => UPLOAD_ERROR_MARKER,
            TransferKind::Download => DOWNLOAD_ERROR_MARKER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransferKind::Upload => "Uploading",
            TransferKind::Download => "Downloading",
        }
    }
}

/// How a transfer ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// A 100% event arrived.
    Completed,
    /// The server closed the stream before reporting 100%.
    StreamEnded { last_percent: u8 },
    /// Validation left nothing to send; no call was made.
    NothingToTransfer,
}

/// Receives transfer progress. All methods default to no-ops.
pub trait TransferObserver {
    /// A local path was dropped before sending.
    fn on_rejected(&mut self, _path: &Path) {}
    /// Progress moved. `percent` never decreases within one transfer.
    fn on_progress(&mut self, _percent: u8, _status: &str) {}
    /// The transfer ended, successfully or not.
    fn on_finish(&mut self, _result: Result<TransferOutcome, &ClientError>) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl TransferObserver for Silent {}

/// Result of checking one event against the terminal conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Heartbeat; nothing to report.
    Skip,
    /// Intermediate progress.
    Progress(u8),
    /// Success terminal.
    Complete,
}

/// Classify one event. The error marker wins over any percentage.
pub fn classify<E: ProgressEvent>(event: &E, error_marker: &str) -> Result<Step, ClientError> {
    if event.status().contains(error_marker) {
        return Err(ClientError::Transfer(event.status().to_string()));
    }
    match event.percent() {
        p if p < 0 => Ok(Step::Skip),
        COMPLETE_PERCENT => Ok(Step::Complete),
        p => Ok(Step::Progress(p.min(COMPLETE_PERCENT - 1) as u8)),
    }
}

/// Drive a transfer stream to a terminal state.
///
/// Stops at the first 100% event even if the server keeps sending, fails on
/// the first status containing the marker, and otherwise runs until the
/// stream ends.
pub async fn consume_progress<E, O>(
    mut stream: ResponseStream<E>,
    kind: TransferKind,
    observer: &mut O,
) -> Result<TransferOutcome, ClientError>
where
    E: ProgressEvent,
    O: TransferObserver + ?Sized,
{
    let mut reported: u8 = 0;
    while let Some(item) = stream.next().await {
        let event = item.map_err(ClientError::transfer)?;
        match classify(&event, kind.error_marker())? {
            Step::Skip => continue,
            Step::Progress(percent) => {
                reported = reported.max(percent);
                observer.on_progress(reported, event.status());
            }
            Step::Complete => {
                observer.on_progress(COMPLETE_PERCENT as u8, event.status());
                return Ok(TransferOutcome::Completed);
            }
        }
    }
    tracing::warn!(
        kind = kind.label(),
        last_percent = reported,
        "transfer stream ended before completion"
    );
    Ok(TransferOutcome::StreamEnded {
        last_percent: reported,
    })
}

/// Open a transfer stream and consume it, reporting the end to `observer`.
pub async fn run_transfer<E, O, F>(
    kind: TransferKind,
    open: F,
    observer: &mut O,
) -> Result<TransferOutcome, ClientError>
where
    E: ProgressEvent,
    O: TransferObserver + ?Sized,
    F: Future<Output = Result<ResponseStream<E>, tonic::Status>>,
{
    let result = match open.await {
        Ok(stream) => consume_progress(stream, kind, observer).await,
        Err(status) => Err(ClientError::transfer(status)),
    };
    match &result {
        Ok(outcome) => observer.on_finish(Ok(*outcome)),
        Err(e) => {
            tracing::warn!(kind = kind.label(), error = %e, "transfer failed");
            observer.on_finish(Err(e));
        }
    }
    result
}

/// Resolve paths to absolute form and keep only existing files.
///
/// Rejected paths are reported to `observer` and never sent.
pub fn resolve_existing_paths<P, O>(paths: &[P], observer: &mut O) -> Vec<PathBuf>
where
    P: AsRef<Path>,
    O: TransferObserver + ?Sized,
{
    let mut valid = Vec::with_capacity(paths.len());
    for path in paths {
        let absolute = std::path::absolute(path.as_ref())
            .map(|p| normalize_lexically(&p))
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        if absolute.is_file() {
            valid.push(absolute);
        } else {
            tracing::warn!(path = %absolute.display(), "invalid file path");
            observer.on_rejected(&absolute);
        }
    }
    valid
}

/// Drop `.` and fold `..` into its parent without touching the filesystem.
///
/// `..` at the root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Encode paths as a JSON array of strings.
pub fn paths_json(paths: &[PathBuf]) -> Result<String, ClientError> {
    let strings: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    serde_json::to_string(&strings).map_err(|e| ClientError::Validation(e.to_string()))
}

/// Upload local files into the knowledge base.
///
/// With no valid paths this is a no-op returning
/// [`TransferOutcome::NothingToTransfer`] and no call is made.
pub async fn upload_files<M, P, O>(
    backend: &M,
    paths: &[P],
    observer: &mut O,
) -> Result<TransferOutcome, ClientError>
where
    M: Middleware + ?Sized,
    P: AsRef<Path>,
    O: TransferObserver + ?Sized,
{
    let valid = resolve_existing_paths(paths, observer);
    if valid.is_empty() {
        tracing::info!("no valid file paths to upload");
        observer.on_finish(Ok(TransferOutcome::NothingToTransfer));
        return Ok(TransferOutcome::NothingToTransfer);
    }

    let request = AddFilesRequest {
        files_to_upload: paths_json(&valid)?,
    };
    tracing::info!(files = %request.files_to_upload, "uploading to knowledge base");
    run_transfer(TransferKind::Upload, backend.add_files(request), observer).await
}

/// Download a model from `url` into `local_path` on the backend host.
pub async fn download_model<M, O>(
    backend: &M,
    url: &str,
    local_path: &str,
    observer: &mut O,
) -> Result<TransferOutcome, ClientError>
where
    M: Middleware + ?Sized,
    O: TransferObserver + ?Sized,
{
    let request = DownloadFilesRequest {
        file_url: url.to_string(),
        local_path: local_path.to_string(),
    };
    tracing::info!(url, local_path, "downloading model");
    run_transfer(TransferKind::Download, backend.download_files(request), observer).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aab_grpc::from_stream;

    fn up(percent: i32, status: &str) -> Result<AddFilesResponse, tonic::Status> {
        Ok(AddFilesResponse {
            current_file_progress: percent,
            files_uploaded: status.to_string(),
        })
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<u8>,
        rejected: Vec<PathBuf>,
    }

    impl TransferObserver for Recorder {
        fn on_rejected(&mut self, path: &Path) {
            self.rejected.push(path.to_path_buf());
        }

        fn on_progress(&mut self, percent: u8, _status: &str) {
            self.progress.push(percent);
        }
    }

    #[test]
    fn test_markers_differ_by_path() {
        assert_eq!(TransferKind::Upload.error_marker(), "ERROR");
        assert_eq!(TransferKind::Download.error_marker(), "Error");
    }

    #[test]
    fn test_classify() {
        let event = AddFilesResponse {
            current_file_progress: -1,
            files_uploaded: String::new(),
        };
        assert_eq!(classify(&event, "ERROR").unwrap(), Step::Skip);

        let event = AddFilesResponse {
            current_file_progress: 100,
            files_uploaded: "done".into(),
        };
        assert_eq!(classify(&event, "ERROR").unwrap(), Step::Complete);

        let event = AddFilesResponse {
            current_file_progress: 42,
            files_uploaded: "a.pdf".into(),
        };
        assert_eq!(classify(&event, "ERROR").unwrap(), Step::Progress(42));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let event = DownloadFilesResponse {
            progress: 10,
            file_downloaded: "ERROR: disk full".into(),
        };
        assert!(classify(&event, DOWNLOAD_ERROR_MARKER).is_ok());
        assert!(classify(&event, UPLOAD_ERROR_MARKER).is_err());
    }

    #[tokio::test]
    async fn test_stops_at_hundred_despite_trailing_events() {
        let stream = from_stream(futures::stream::iter(vec![
            up(10, "a"),
            up(100, "a"),
            up(5, "ERROR: should never be seen"),
        ]));
        let mut rec = Recorder::default();
        let outcome = consume_progress(stream, TransferKind::Upload, &mut rec)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::Completed);
        assert_eq!(rec.progress, vec![10, 100]);
    }

    #[tokio::test]
    async fn test_error_marker_raises_regardless_of_percent() {
        let stream = from_stream(futures::stream::iter(vec![
            up(30, "a"),
            up(100, "ERROR: Access denied"),
        ]));
        let mut rec = Recorder::default();
        let err = consume_progress(stream, TransferKind::Upload, &mut rec)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transfer(ref msg) if msg == "ERROR: Access denied"));
        assert_eq!(rec.progress, vec![30]);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_heartbeats_skipped() {
        let stream = from_stream(futures::stream::iter(vec![
            up(20, "a"),
            up(-1, ""),
            up(15, "b"),
            up(60, "b"),
        ]));
        let mut rec = Recorder::default();
        let outcome = consume_progress(stream, TransferKind::Upload, &mut rec)
            .await
            .unwrap();
        assert_eq!(outcome, TransferOutcome::StreamEnded { last_percent: 60 });
        assert_eq!(rec.progress, vec![20, 20, 60]);
    }

    #[tokio::test]
    async fn test_transport_error_is_transfer_failure() {
        let stream = from_stream(futures::stream::iter(vec![
            up(20, "a"),
            Err(tonic::Status::unavailable("broken pipe")),
        ]));
        let err = consume_progress(stream, TransferKind::Upload, &mut Silent)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transfer(ref msg) if msg == "broken pipe"));
    }

    #[test]
    fn test_resolve_existing_paths_filters_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("doc.pdf");
        std::fs::write(&present, b"%PDF").unwrap();
        let missing = dir.path().join("missing.pdf");

        let mut rec = Recorder::default();
        let valid = resolve_existing_paths(&[present.clone(), missing.clone()], &mut rec);
        assert_eq!(valid, vec![present]);
        assert_eq!(rec.rejected, vec![missing]);
    }

    #[test]
    fn test_resolve_folds_parent_components() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("doc.pdf");
        std::fs::write(&present, b"%PDF").unwrap();

        let through_missing = dir.path().join("missing").join("..").join("doc.pdf");
        let through_dot = dir.path().join(".").join("doc.pdf");
        let valid = resolve_existing_paths(&[through_missing, through_dot], &mut Silent);
        assert_eq!(valid, vec![present.clone(), present]);
    }

    #[test]
    fn test_resolve_makes_relative_paths_absolute() {
        let dir = tempfile::Builder::new().tempdir_in(".").unwrap();
        let name = dir.path().file_name().unwrap().to_owned();
        std::fs::write(dir.path().join("doc.pdf"), b"%PDF").unwrap();

        let relative = Path::new(".").join(&name).join("sub").join("..").join("doc.pdf");
        let valid = resolve_existing_paths(&[relative], &mut Silent);
        let expected = std::env::current_dir().unwrap().join(&name).join("doc.pdf");
        assert_eq!(valid, vec![expected]);
        assert!(valid[0].is_absolute());
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c.txt")),
            PathBuf::from("/a/c.txt")
        );
        assert_eq!(normalize_lexically(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_resolve_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let valid = resolve_existing_paths(&[dir.path()], &mut Silent);
        assert!(valid.is_empty());
    }

    #[test]
    fn test_paths_json() {
        let json = paths_json(&[PathBuf::from("/abs/file1")]).unwrap();
        assert_eq!(json, r#"["/abs/file1"]"#);
    }
}
