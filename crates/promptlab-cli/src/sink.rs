//! File sink for exported prompts

use std::path::Path;

use promptlab_core::Result;

/// Write an export string to `path` verbatim, creating parent directories
pub async fn write_export(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, contents).await?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_export_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("prompt.md");
        let contents = "# Optimized Prompt\n\nTask: Write a haiku\n";

        write_export(&path, contents).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, contents);
    }

    #[tokio::test]
    async fn test_write_export_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");

        write_export(&path, "first").await.unwrap();
        write_export(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
