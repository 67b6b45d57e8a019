use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Append-only text target. Each call appends exactly one line plus a
/// line terminator.
#[async_trait]
pub trait OutputSink: Send + Sync + 'static {
    async fn append_line(&self, line: &str) -> std::io::Result<()>;
}

/// Appends to a file, creating it on first use.
///
/// The file is reopened for every line, so several observers can share one
/// path and external tools may rotate it between writes.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OutputSink for FileSink {
    async fn append_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // single write so concurrent appenders never interleave within a line
        file.write_all(format!("{line}\n").as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_lines_with_terminator() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let sink = FileSink::new(dir.path().join("stock_update.txt"));

        sink.append_line("first").await?;
        sink.append_line("second").await?;

        let text = tokio::fs::read_to_string(sink.path()).await?;
        assert_eq!(text, "first\nsecond\n");
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("no/such/dir/out.txt"));

        assert!(sink.append_line("x").await.is_err());
    }
}
