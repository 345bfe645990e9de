//! Streaming download of recording videos
//!
//! Recordings are fetched one at a time from `POST /recordings/<id>/Play/`
//! and copied to `<id>.avi` through a fixed [`CHUNK_SIZE`] buffer, so peak
//! memory stays flat whatever the size of the video.
//!
//! If a download fails after its file was created, the partial file is
//! removed before the error is returned. A `.avi` left on disk is always a
//! complete one.

use crate::error::{ExportError, ExportResult};
use crate::recording::{Recording, RecordingSet};
use crate::session::ApiSession;
use futures::TryStreamExt;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, info, warn};

/// Size of the copy buffer between the response body and the output file
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Observer for download progress
///
/// All methods default to doing nothing.
pub trait DownloadProgress: Send + Sync {
    /// The response was accepted; `expected_len` is the advertised body size
    fn on_start(&self, _session_id: &str, _expected_len: Option<u64>) {}

    /// A chunk was written; `bytes_so_far` is the running total
    fn on_chunk(&self, _session_id: &str, _bytes_so_far: u64) {}

    /// The whole body was written and flushed
    fn on_finish(&self, _session_id: &str, _bytes: u64) {}
}

/// Progress observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {}

/// Outcome of a download run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Path of the video file for a recording
pub fn video_path(output_dir: &Path, recording: &Recording) -> ExportResult<PathBuf> {
    Ok(output_dir.join(format!("{}.avi", recording.file_stem()?)))
}

/// Download the video of every recording in `set` into `output_dir`
///
/// Creates `output_dir` first. Recordings are processed in order; the first
/// failure stops the run.
pub async fn download_recordings(
    session: &ApiSession,
    output_dir: &Path,
    set: &RecordingSet,
    progress: &dyn DownloadProgress,
) -> ExportResult<DownloadSummary> {
    info!(
        count = set.len(),
        path = %output_dir.display(),
        "starting download of recordings"
    );

    fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ExportError::io(output_dir, e))?;

    let mut summary = DownloadSummary::default();
    for recording in set {
        let bytes = download_recording(session, output_dir, recording, progress)
            .await
            .map_err(|e| e.for_recording(&recording.session_id))?;
        summary.files += 1;
        summary.bytes += bytes;
    }

    Ok(summary)
}

async fn download_recording(
    session: &ApiSession,
    output_dir: &Path,
    recording: &Recording,
    progress: &dyn DownloadProgress,
) -> ExportResult<u64> {
    let session_id = recording.file_stem()?;
    let path = video_path(output_dir, recording)?;
    let file = File::create(&path)
        .await
        .map_err(|e| ExportError::io(&path, e))?;

    let result = stream_to_file(session, session_id, file, &path, progress).await;

    match result {
        Ok(bytes) => {
            info!(
                session_id,
                bytes,
                file = %path.display(),
                "download complete"
            );
            Ok(bytes)
        }
        Err(e) => {
            // the file handle is already closed here
            if let Err(remove_err) = fs::remove_file(&path).await {
                warn!(file = %path.display(), "could not remove partial download: {}", remove_err);
            }
            Err(e)
        }
    }
}

async fn stream_to_file<W>(
    session: &ApiSession,
    session_id: &str,
    mut file: W,
    path: &Path,
    progress: &dyn DownloadProgress,
) -> ExportResult<u64>
where
    W: AsyncWrite + Unpin,
{
    let url = session.url(&format!("/recordings/{}/Play/", session_id));

    let response = session
        .post(&url)
        .header(ACCEPT, "*/*")
        .send()
        .await
        .map_err(|e| ExportError::transport(&url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = %url, "could not read error response body: {}", e);
                String::new()
            }
        };
        return Err(ExportError::protocol(
            &url,
            Some(status.as_u16()),
            format!("unexpected status code: {}", body.trim()),
        ));
    }

    progress.on_start(session_id, response.content_length());

    let body = Box::pin(response.bytes_stream().map_err(io::Error::other));
    let mut reader = StreamReader::new(body);

    let bytes = copy_chunked(&mut reader, &mut file, |so_far| {
        progress.on_chunk(session_id, so_far)
    })
    .await
    .map_err(|e| match e {
        CopyError::Read { bytes, source } => ExportError::Stream {
            url: url.clone(),
            bytes,
            source,
        },
        CopyError::Write { source } => ExportError::io(path, source),
    })?;

    file.flush().await.map_err(|e| ExportError::io(path, e))?;
    progress.on_finish(session_id, bytes);

    Ok(bytes)
}

/// Failure inside [`copy_chunked`], split by side
#[derive(Debug)]
pub(crate) enum CopyError {
    Read { bytes: u64, source: io::Error },
    Write { source: io::Error },
}

/// Copy `reader` to `writer` through a [`CHUNK_SIZE`] buffer
///
/// `on_chunk` receives the running byte count after every write. Returns the
/// total number of bytes copied once the reader reports end of stream.
pub(crate) async fn copy_chunked<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    mut on_chunk: F,
) -> Result<u64, CopyError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
    F: FnMut(u64),
{
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = reader
            .read(&mut buffer)
            .await
            .map_err(|source| CopyError::Read {
                bytes: total,
                source,
            })?;
        if n == 0 {
            break;
        }

        writer
            .write_all(&buffer[..n])
            .await
            .map_err(|source| CopyError::Write { source })?;
        total += n as u64;
        on_chunk(total);
    }

    Ok(total)
}
