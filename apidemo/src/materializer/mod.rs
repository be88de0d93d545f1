//! Request body decoding and file materialization.
//!
//! Every operation here consumes a request body as a stream of [`Bytes`] chunks, which is
//! what axum hands out through [`axum::body::Body::into_data_stream`]. That keeps the
//! module usable (and testable) without a running server.
//!
//! - [`decode_text`] / [`decode_bytes`]: collect the whole body
//! - [`decode_form`]: `application/x-www-form-urlencoded` into ordered pairs
//! - [`decode_object`]: JSON into a typed record
//! - [`stream_to_file`]: incremental copy of a body onto disk
//! - [`Materializer`]: the same operations bound to the configured upload directory,
//!   plus multipart ingestion (see [`multipart`])
//!
//! Stream read failures surface as [`Error::Io`]; decoding failures as
//! [`Error::MalformedPayload`].

pub mod multipart;
mod paths;

use std::io;
use std::path::{Path, PathBuf};
use std::pin::pin;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;
use tracing::{debug, info, instrument, trace};

use crate::config::UploadsConfig;
use crate::errors::{Error, Result};

pub use multipart::{FilePart, MultipartReader, Part, UploadDescriptor};
pub use paths::safe_join;

/// Error type accepted from body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a single streaming copy to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Absolute path of the written file
    pub path: PathBuf,
    pub bytes_written: u64,
    /// Result of the existence check performed after the copy
    pub exists: bool,
}

/// Read the whole body into memory.
pub async fn decode_bytes<S, E>(body: S) -> Result<Bytes>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let mut body = pin!(body);
    let mut buffer = BytesMut::new();
    let mut chunks = 0usize;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| Error::io("read request body", io::Error::other(e)))?;
        chunks += 1;
        trace!(len = chunk.len(), "Received body chunk");
        buffer.extend_from_slice(&chunk);
    }

    debug!(chunks, bytes = buffer.len(), "Collected request body");
    Ok(buffer.freeze())
}

/// Read the whole body as UTF-8 text. No size limit is applied here.
pub async fn decode_text<S, E>(body: S) -> Result<String>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let bytes = decode_bytes(body).await?;
    String::from_utf8(bytes.into()).map_err(|e| Error::malformed(format!("Request body is not valid UTF-8: {e}")))
}

/// Reinterpret raw bytes as text, replacing invalid UTF-8 sequences.
pub fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parse an url-encoded form body. Pairs keep their order and duplicate keys are not merged.
pub async fn decode_form<S, E>(body: S) -> Result<Vec<(String, String)>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let bytes = decode_bytes(body).await?;
    serde_urlencoded::from_bytes(&bytes).map_err(|e| Error::malformed(format!("Invalid form body: {e}")))
}

/// Parse a JSON body into `T`.
pub async fn decode_object<T, S, E>(body: S) -> Result<T>
where
    T: DeserializeOwned,
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let bytes = decode_bytes(body).await?;
    serde_json::from_slice(&bytes).map_err(|e| Error::malformed(format!("Invalid JSON body: {e}")))
}

/// Copy `body` into `destination` chunk by chunk.
///
/// Missing parent directories are created first and an existing file is truncated. The
/// writer is shut down whether or not the copy succeeded; a failed copy leaves whatever
/// was written so far in place for the caller to inspect.
#[instrument(skip_all, fields(destination = %destination.display()), err)]
pub async fn stream_to_file<S, E>(body: S, destination: &Path) -> Result<StoredFile>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<BoxError>,
{
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(format!("create directory {}", parent.display()), e))?;
    }

    let path = std::path::absolute(destination).map_err(|e| Error::io("resolve upload path", e))?;
    let file = fs::File::create(&path)
        .await
        .map_err(|e| Error::io(format!("create {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);

    let mut reader = pin!(StreamReader::new(body.map_err(io::Error::other)));
    let copied = tokio::io::copy(&mut reader, &mut writer).await;
    let closed = writer.shutdown().await;

    let bytes_written = copied.map_err(|e| Error::io(format!("write {}", path.display()), e))?;
    closed.map_err(|e| Error::io(format!("close {}", path.display()), e))?;

    let exists = fs::try_exists(&path).await.unwrap_or(false);
    info!(path = %path.display(), bytes_written, exists, "Materialized request body");

    Ok(StoredFile {
        path,
        bytes_written,
        exists,
    })
}

/// Body decoding bound to one upload directory and inline field limit.
#[derive(Debug, Clone)]
pub struct Materializer {
    upload_dir: PathBuf,
    form_field_limit: usize,
}

impl Materializer {
    pub fn new(upload_dir: impl Into<PathBuf>, form_field_limit: usize) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            form_field_limit,
        }
    }

    pub fn from_config(config: &UploadsConfig) -> Self {
        Self::new(config.directory.clone(), config.form_field_limit)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn form_field_limit(&self) -> usize {
        self.form_field_limit
    }

    /// Where a file named `file_name` lands inside the upload directory.
    pub fn destination(&self, file_name: &str) -> Result<PathBuf> {
        safe_join(&self.upload_dir, file_name)
    }

    /// Stream `body` into the upload directory under `file_name`.
    pub async fn save<S, E>(&self, body: S, file_name: &str) -> Result<StoredFile>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let destination = self.destination(file_name)?;
        stream_to_file(body, &destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::echo::EchoRecord;
    use futures::stream;

    fn body_of(chunks: &[&[u8]]) -> impl Stream<Item = std::result::Result<Bytes, io::Error>> + use<> {
        let chunks: Vec<_> = chunks.iter().map(|c| Ok(Bytes::copy_from_slice(c))).collect();
        stream::iter(chunks)
    }

    fn failing_body(prefix: &'static [u8]) -> impl Stream<Item = std::result::Result<Bytes, io::Error>> {
        stream::iter(vec![
            Ok(Bytes::from_static(prefix)),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
        ])
    }

    #[test_log::test(tokio::test)]
    async fn test_decode_text_round_trips() {
        for text in ["", "hello", "multi\nline body", "ünïcödé ✓ 日本語"] {
            let bytes = text.as_bytes();
            let (head, tail) = bytes.split_at(bytes.len() / 2);
            let decoded = decode_text(body_of(&[head, tail])).await.unwrap();
            assert_eq!(decoded, text);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_decode_text_rejects_invalid_utf8() {
        let err = decode_text(body_of(&[&[0xff, 0xfe]])).await.unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_decode_bytes_is_exact_and_text_view_is_lossy() {
        let raw: &[u8] = &[b'h', b'i', 0xff, 0x00, b'!'];
        let decoded = decode_bytes(body_of(&[&raw[..2], &raw[2..]])).await.unwrap();
        assert_eq!(decoded.as_ref(), raw);

        // Non-UTF-8 input does not survive the text view, and that is expected
        assert_eq!(lossy_text(&decoded), "hi\u{fffd}\u{0}!");
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_errors_surface_as_io_failures() {
        let err = decode_bytes(failing_body(b"partial")).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_decode_form_keeps_duplicates_in_order() {
        let pairs = decode_form(body_of(&[b"a=1&b=two+words&a=3&empty="])).await.unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two words".to_string()),
                ("a".to_string(), "3".to_string()),
                ("empty".to_string(), String::new()),
            ]
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_decode_object_with_omitted_nullable_fields() {
        let record: EchoRecord = decode_object(body_of(&[br#"{"intField":1,"stringField":"a"}"#]))
            .await
            .unwrap();
        assert_eq!(record.int_field, 1);
        assert_eq!(record.string_field, "a");
        assert_eq!(record.nullable_int_field, None);
        assert_eq!(record.nullable_string_field, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_decode_object_with_explicit_nulls() {
        let record: EchoRecord = decode_object(body_of(&[
            br#"{"intField":7,"stringField":"b","nullableIntField":null,"nullableStringField":"x"}"#,
        ]))
        .await
        .unwrap();
        assert_eq!(record.nullable_int_field, None);
        assert_eq!(record.nullable_string_field.as_deref(), Some("x"));
    }

    #[test_log::test(tokio::test)]
    async fn test_decode_object_missing_required_field() {
        let err = decode_object::<EchoRecord, _, _>(body_of(&[br#"{"stringField":"a"}"#]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));

        let err = decode_object::<EchoRecord, _, _>(body_of(&[br#"{"intField":"one","stringField":"a"}"#]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_to_file_creates_parents_and_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nested/deeper/file.txt");

        let first = stream_to_file(body_of(&[b"first ", b"content"]), &destination).await.unwrap();
        assert!(first.exists);
        assert_eq!(first.bytes_written, 13);
        assert!(first.path.is_absolute());

        let second = stream_to_file(body_of(&[b"2nd"]), &destination).await.unwrap();
        assert_eq!(second.bytes_written, 3);
        assert_eq!(second.path, first.path);
        assert_eq!(std::fs::read(&destination).unwrap(), b"2nd");
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_to_file_failure_leaves_detectable_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("partial.bin");

        let err = stream_to_file(failing_body(b"half"), &destination).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));

        // No cleanup is attempted; the caller decides what to do with the remains
        assert!(destination.exists());
        assert_eq!(std::fs::read(&destination).unwrap(), b"half");
    }

    #[test_log::test(tokio::test)]
    async fn test_save_rejects_escaping_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let materializer = Materializer::new(dir.path().join("uploads"), 1024);

        let err = materializer.save(body_of(&[b"x"]), "../outside.txt").await.unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { .. }));
        assert!(!dir.path().join("outside.txt").exists());
    }
}
