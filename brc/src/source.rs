//! Seekable byte sources the pipeline reads from.
//!
//! Every worker calls [`ByteSource::open`] to get a reader of its own, so
//! concurrent partitions never share a cursor.

use std::future::{self, Future};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek};

pub trait ByteSource: Send + Sync + 'static {
    type Reader: AsyncRead + AsyncSeek + Unpin + Send + 'static;

    /// Total length in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens an independent reader positioned at offset 0.
    fn open(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send;
}

/// A file on disk. The length is captured once when the source is created.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    len: u64,
}

impl FileSource {
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let len = tokio::fs::metadata(&path).await?.len();
        Ok(Self { path, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    type Reader = File;

    fn len(&self) -> u64 {
        self.len
    }

    fn open(&self) -> impl Future<Output = io::Result<File>> + Send {
        let path = self.path.clone();
        async move { File::open(path).await }
    }
}

/// Shared in-memory bytes.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }
}

impl ByteSource for MemorySource {
    type Reader = Cursor<Arc<[u8]>>;

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn open(&self) -> impl Future<Output = io::Result<Self::Reader>> + Send {
        future::ready(Ok(Cursor::new(Arc::clone(&self.data))))
    }
}
