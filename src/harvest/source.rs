//! Page snapshots and the sources that produce them

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use super::fetcher::FetchError;

/// One rendered document: the main page or an embedded frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Document URL, when known
    pub url: Option<Url>,
    pub html: String,
}

impl Frame {
    pub fn new(url: Option<Url>, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }
}

/// Everything loaded for one page. The main document is always first.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: Url,
    pub frames: Vec<Frame>,
}

impl PageSnapshot {
    /// Snapshot holding only the main document
    pub fn single(url: Url, html: impl Into<String>) -> Self {
        let frame = Frame::new(Some(url.clone()), html);
        Self {
            url,
            frames: vec![frame],
        }
    }

    /// The main document, if any frame was loaded
    pub fn main_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }
}

/// Anything that can turn a page URL into rendered HTML
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load(&self, url: &Url) -> Result<PageSnapshot, FetchError>;
}

/// Page source reading saved HTML from disk.
///
/// `file://` URLs are read directly. For other URLs the path is
/// `<root>/<host>/<url path>`, with `index.html` for directory paths and
/// `.html` appended when the last segment has no extension. Files named
/// `<stem>.frame1.html`, `<stem>.frame2.html`, ... next to the main file are
/// loaded as embedded frames.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    max_frames: usize,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_frames: 8,
        }
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Map a page URL to the file holding its main document
    pub fn path_for(&self, url: &Url) -> Result<PathBuf, FetchError> {
        if url.scheme() == "file" {
            return url
                .to_file_path()
                .map_err(|_| FetchError::InvalidUrl(url.to_string()));
        }

        let host = url
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;
        let mut path = self.root.join(host);

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty() && *seg != "..").collect())
            .unwrap_or_default();
        for segment in &segments {
            path.push(segment);
        }

        if url.path().ends_with('/') || segments.is_empty() {
            path.push("index.html");
        } else if path.extension().is_none() {
            path.set_extension("html");
        }
        Ok(path)
    }

    fn frame_path(main: &Path, index: usize) -> Option<PathBuf> {
        let stem = main.file_stem()?.to_str()?;
        Some(main.with_file_name(format!("{stem}.frame{index}.html")))
    }
}

#[async_trait]
impl PageSource for FileSource {
    async fn load(&self, url: &Url) -> Result<PageSnapshot, FetchError> {
        let path = self.path_for(url)?;
        let html = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;

        let mut snapshot = PageSnapshot::single(url.clone(), html);

        for index in 1..=self.max_frames {
            let Some(frame_path) = Self::frame_path(&path, index) else {
                break;
            };
            match tokio::fs::read_to_string(&frame_path).await {
                Ok(html) => snapshot.frames.push(Frame::new(None, html)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => break,
                Err(e) => {
                    tracing::warn!(frame = %frame_path.display(), error = %e, "Skipping embedded frame");
                }
            }
        }

        tracing::debug!(path = %path.display(), frames = snapshot.frames.len(), "Loaded snapshot");
        Ok(snapshot)
    }
}
