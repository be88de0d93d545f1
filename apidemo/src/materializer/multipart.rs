//! `multipart/form-data` ingestion.
//!
//! [`MultipartReader`] walks the body once, in stream order, yielding a [`Part`] per field.
//! Inline fields are read into memory up to the configured limit; file fields keep their
//! content as a stream so it can be copied to disk without buffering.
//!
//! A part owns the parser's lock on the body until it is dropped, so the next part cannot
//! be read while a previous one is still alive. [`Materializer::materialize_multipart`]
//! scopes each part with a guard that releases it on every exit path.

use std::path::PathBuf;

use bytes::{Bytes, BytesMut};
use futures::Stream;
use tracing::{debug, info, trace};

use super::{BoxError, Materializer, StoredFile, stream_to_file};
use crate::errors::{Error, Result};

/// One field of a multipart body.
#[derive(Debug)]
pub enum Part {
    /// Inline value, already read into memory
    Form { name: String, value: String },
    /// Field that carried a `filename` in its content disposition
    File(FilePart),
}

/// File field whose content is still on the wire.
pub struct FilePart {
    name: String,
    file_name: String,
    content: multer::Field<'static>,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("name", &self.name)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

impl FilePart {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client's original file name, unvalidated.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The remaining content chunks.
    pub fn content(&mut self) -> &mut multer::Field<'static> {
        &mut self.content
    }
}

impl Part {
    pub fn name(&self) -> &str {
        match self {
            Part::Form { name, .. } => name,
            Part::File(file) => file.name(),
        }
    }

    /// Release the part and its hold on the underlying body.
    pub fn dispose(self) {
        trace!(field = self.name(), "Released multipart part");
        drop(self);
    }
}

/// What a multipart upload left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDescriptor {
    /// Value of the last inline field, whatever its name; empty if none was sent
    pub description: String,
    /// Original name of the last file part
    pub file_name: String,
    /// Absolute path of the last file written
    pub stored_path: Option<PathBuf>,
    pub exists: bool,
    pub bytes_written: u64,
    /// Every inline field in stream order
    pub fields: Vec<(String, String)>,
}

impl UploadDescriptor {
    fn record_field(&mut self, name: &str, value: &str) {
        self.description = value.to_string();
        self.fields.push((name.to_string(), value.to_string()));
    }

    fn record_file(&mut self, file_name: &str, stored: StoredFile) {
        self.file_name = file_name.to_string();
        self.stored_path = Some(stored.path);
        self.exists = stored.exists;
        self.bytes_written = stored.bytes_written;
    }
}

/// Single-pass reader over a multipart body.
pub struct MultipartReader {
    inner: multer::Multipart<'static>,
    form_field_limit: usize,
    parts_read: usize,
}

impl std::fmt::Debug for MultipartReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartReader")
            .field("form_field_limit", &self.form_field_limit)
            .field("parts_read", &self.parts_read)
            .finish_non_exhaustive()
    }
}

impl MultipartReader {
    pub fn new<S, E>(body: S, boundary: impl Into<String>, form_field_limit: usize) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            inner: multer::Multipart::new(body, boundary),
            form_field_limit,
            parts_read: 0,
        }
    }

    /// Extract the boundary from a `multipart/form-data` content type header value.
    pub fn boundary(content_type: &str) -> Result<String> {
        multer::parse_boundary(content_type)
            .map_err(|e| Error::malformed(format!("Expected a multipart/form-data content type: {e}")))
    }

    /// Next part in stream order, or `None` once the closing boundary has been read.
    ///
    /// Any previously returned part must have been dropped first.
    pub async fn next_part(&mut self) -> Result<Option<Part>> {
        let Some(mut field) = self.inner.next_field().await.map_err(multipart_error)? else {
            debug!(parts = self.parts_read, "Multipart body exhausted");
            return Ok(None);
        };
        self.parts_read += 1;

        let name = field.name().unwrap_or_default().to_string();
        let part = match field.file_name().map(str::to_string) {
            Some(file_name) => {
                debug!(field = %name, file_name = %file_name, "Multipart file part");
                Part::File(FilePart {
                    name,
                    file_name,
                    content: field,
                })
            }
            None => {
                let value = read_inline(&mut field, &name, self.form_field_limit).await?;
                debug!(field = %name, bytes = value.len(), "Multipart form part");
                Part::Form { name, value }
            }
        };

        Ok(Some(part))
    }
}

async fn read_inline(field: &mut multer::Field<'static>, name: &str, limit: usize) -> Result<String> {
    let mut value = BytesMut::new();

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if value.len() + chunk.len() > limit {
            return Err(Error::PayloadTooLarge {
                message: format!("Form field '{name}' exceeds the limit of {limit} bytes"),
            });
        }
        value.extend_from_slice(&chunk);
    }

    String::from_utf8(value.to_vec()).map_err(|_| Error::malformed(format!("Form field '{name}' is not valid UTF-8")))
}

fn multipart_error(err: multer::Error) -> Error {
    match err {
        multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => Error::PayloadTooLarge {
            message: err.to_string(),
        },
        multer::Error::StreamReadFailed(source) => Error::io("read multipart body", std::io::Error::other(source)),
        other => Error::Internal {
            operation: format!("parse multipart body ({other})"),
        },
    }
}

impl Materializer {
    /// Start reading a multipart body using this materializer's inline field limit.
    pub fn decode_multipart<S, E>(&self, body: S, boundary: impl Into<String>) -> MultipartReader
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        MultipartReader::new(body, boundary, self.form_field_limit)
    }

    /// Read every part of a multipart body, writing file parts into the upload directory.
    ///
    /// Errors abort the walk immediately; files written by earlier parts stay on disk.
    pub async fn materialize_multipart<S, E>(&self, body: S, boundary: impl Into<String>) -> Result<UploadDescriptor>
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let mut reader = self.decode_multipart(body, boundary);
        let mut upload = UploadDescriptor::default();

        while let Some(part) = reader.next_part().await? {
            let mut part = scopeguard::guard(part, Part::dispose);
            self.materialize_part(&mut part, &mut upload).await?;
        }

        info!(
            file_name = %upload.file_name,
            exists = upload.exists,
            bytes_written = upload.bytes_written,
            fields = upload.fields.len(),
            "Multipart upload complete"
        );
        Ok(upload)
    }

    async fn materialize_part(&self, part: &mut Part, upload: &mut UploadDescriptor) -> Result<()> {
        match part {
            Part::Form { name, value } => upload.record_field(name, value),
            Part::File(file) => {
                let destination = self.destination(file.file_name())?;
                let stored = stream_to_file(file.content(), &destination).await?;
                upload.record_file(&file.file_name, stored);
            }
        }
        Ok(())
    }
}
