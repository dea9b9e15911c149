//! Where rendered fragments end up.
//!
//! The portal writes two fragments: the metrics body (`portal-root`) and the
//! error list (`portal-errors`). A target decides what "mounting" one means.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::{PortalError, Result};

pub const ROOT_ELEMENT: &str = "portal-root";
pub const ERRORS_ELEMENT: &str = "portal-errors";

#[async_trait]
pub trait RenderTarget: Send + Sync {
    async fn mount_root(&self, html: &str) -> Result<()>;
    async fn mount_errors(&self, html: &str) -> Result<()>;
}

/// Writes `portal-root.html` and `portal-errors.html` into a directory.
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, element: &str) -> PathBuf {
        self.dir.join(format!("{element}.html"))
    }

    async fn write(&self, element: &str, html: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(element);
        tokio::fs::write(&path, html)
            .await
            .map_err(|e| PortalError::Render {
                message: format!("writing {}: {}", path.display(), e),
            })?;
        debug!("Mounted {} ({} bytes)", path.display(), html.len());
        Ok(())
    }
}

#[async_trait]
impl RenderTarget for DirectoryTarget {
    async fn mount_root(&self, html: &str) -> Result<()> {
        self.write(ROOT_ELEMENT, html).await
    }

    async fn mount_errors(&self, html: &str) -> Result<()> {
        self.write(ERRORS_ELEMENT, html).await
    }
}

/// Prints each fragment under a header line.
pub struct StdoutTarget;

impl StdoutTarget {
    pub fn format(element: &str, html: &str) -> String {
        format!("<!-- {element} -->\n{}", html.trim_start_matches('\n'))
    }
}

#[async_trait]
impl RenderTarget for StdoutTarget {
    async fn mount_root(&self, html: &str) -> Result<()> {
        println!("{}", Self::format(ROOT_ELEMENT, html));
        Ok(())
    }

    async fn mount_errors(&self, html: &str) -> Result<()> {
        println!("{}", Self::format(ERRORS_ELEMENT, html));
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Mounted {
    pub root: Option<String>,
    pub errors: Option<String>,
    pub root_mounts: usize,
    pub error_mounts: usize,
}

/// Keeps the latest fragments in memory. Clones share the same slots.
#[derive(Debug, Default, Clone)]
pub struct MemoryTarget {
    inner: Arc<Mutex<Mounted>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Mounted {
        self.inner
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn with<F: FnOnce(&mut Mounted)>(&self, f: F) -> Result<()> {
        let mut guard = self.inner.lock().map_err(|_| PortalError::Render {
            message: "memory target lock poisoned".to_string(),
        })?;
        f(&mut guard);
        Ok(())
    }
}

#[async_trait]
impl RenderTarget for MemoryTarget {
    async fn mount_root(&self, html: &str) -> Result<()> {
        self.with(|m| {
            m.root = Some(html.to_string());
            m.root_mounts += 1;
        })
    }

    async fn mount_errors(&self, html: &str) -> Result<()> {
        self.with(|m| {
            m.errors = Some(html.to_string());
            m.error_mounts += 1;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directory_target_creates_element_files() {
        let tmp = tempfile::tempdir().unwrap();
        let target = DirectoryTarget::new(tmp.path().join("out"));

        target.mount_root("<h2>hi</h2>").await.unwrap();
        target.mount_errors("<li>x</li>").await.unwrap();

        let root = std::fs::read_to_string(target.path_for(ROOT_ELEMENT)).unwrap();
        let errors = std::fs::read_to_string(target.path_for(ERRORS_ELEMENT)).unwrap();
        assert_eq!(root, "<h2>hi</h2>");
        assert_eq!(errors, "<li>x</li>");
    }

    #[test]
    fn stdout_headers_are_laid_out_alike() {
        let root = StdoutTarget::format(ROOT_ELEMENT, "\n<h2>hi</h2>\n");
        let errors = StdoutTarget::format(ERRORS_ELEMENT, "<li>x</li>");
        assert_eq!(root, "<!-- portal-root -->\n<h2>hi</h2>\n");
        assert_eq!(errors, "<!-- portal-errors -->\n<li>x</li>");
    }

    #[tokio::test]
    async fn memory_target_clones_share_state() {
        let target = MemoryTarget::new();
        let handle = target.clone();

        target.mount_root("a").await.unwrap();
        target.mount_root("b").await.unwrap();

        let seen = handle.snapshot();
        assert_eq!(seen.root.as_deref(), Some("b"));
        assert_eq!(seen.root_mounts, 2);
        assert!(seen.errors.is_none());
    }
}
