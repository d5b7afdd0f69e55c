use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{FutureExt, TryStreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::Transcoder;

/// Where a selected file's bytes live.
#[derive(Debug, Clone)]
pub enum FileHandle {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// Content the host already holds in memory.
    Memory(Bytes),
}

/// A file handed over by a drop or a file-input selection.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub name: String,
    /// Size in bytes as reported by the platform.
    pub size: u64,
    pub handle: FileHandle,
}

impl FileDescriptor {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            handle: FileHandle::Memory(bytes),
        }
    }

    /// Describe a local file (name from the last path component, size from metadata).
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            name,
            size: metadata.len(),
            handle: FileHandle::Path(path.to_path_buf()),
        })
    }
}

/// Platform primitive that reads a whole file as text.
pub trait FileReader: Send + Sync {
    fn read_as_text<'a>(
        &'a self,
        file: &'a FileDescriptor,
        encoding: &'static encoding_rs::Encoding,
    ) -> BoxFuture<'a, io::Result<String>>;
}

/// Reads files through tokio, transcoding to UTF-8 as the bytes stream in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read_as_text<'a>(
        &'a self,
        file: &'a FileDescriptor,
        encoding: &'static encoding_rs::Encoding,
    ) -> BoxFuture<'a, io::Result<String>> {
        async move {
            match &file.handle {
                FileHandle::Path(path) => {
                    let raw = File::open(path).await?;
                    decode_to_text(raw, encoding).await
                }
                FileHandle::Memory(bytes) => decode_to_text(&bytes[..], encoding).await,
            }
        }
        .boxed()
    }
}

/// Drain an `AsyncRead` into a `String`, decoding from `encoding`.
pub async fn decode_to_text<R>(raw: R, encoding: &'static encoding_rs::Encoding) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    // 64 KiB reads keep syscalls down without holding much beyond the text itself
    let mut frames = FramedRead::with_capacity(raw, Transcoder::new(encoding), 1 << 16);
    let mut text = String::new();
    while let Some(chunk) = frames.try_next().await? {
        text.push_str(&chunk);
    }
    Ok(text)
}

/// Map an encoding label (any WHATWG label, case-insensitive) to an encoding.
///
/// Missing labels mean UTF-8; unknown ones fall back to UTF-8 with a warning.
pub fn resolve_encoding(label: Option<&str>) -> &'static encoding_rs::Encoding {
    let Some(label) = label else {
        return encoding_rs::UTF_8;
    };
    match encoding_rs::Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => encoding,
        None => {
            tracing::warn!(label, "unknown text encoding, reading as utf-8");
            encoding_rs::UTF_8
        }
    }
}
