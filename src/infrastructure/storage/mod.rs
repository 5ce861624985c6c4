//! Local files turned into message attachments

use std::path::{Path, PathBuf};
use poise::serenity_prelude as serenity;
use crate::application::errors::BotError;

/// Where attachment content comes from
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Attachment plus the URL an embed can reference it by
pub struct Attached {
    pub url: String,
    pub attachment: serenity::CreateAttachment,
}

/// Name the attachment gets; bytes need an explicit one
pub fn attachment_name(source: &FileSource, file_name: Option<&str>) -> Result<String, BotError> {
    if let Some(name) = file_name.filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }
    match source {
        FileSource::Path(path) => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BotError::Value(format!("'{}' has no file name", path.display()))),
        FileSource::Bytes(_) => Err(BotError::Value(
            "file_name must be specified when file is bytes".to_string(),
        )),
    }
}

/// `attachment://<name>`
pub fn attachment_url(name: &str) -> String {
    format!("attachment://{}", name)
}

/// Wrap a file for sending alongside a message
pub async fn attach(source: FileSource, file_name: Option<&str>) -> Result<Attached, BotError> {
    let name = attachment_name(&source, file_name)?;
    let data = match source {
        FileSource::Path(path) => tokio::fs::read(&path).await?,
        FileSource::Bytes(bytes) => bytes,
    };
    Ok(Attached {
        url: attachment_url(&name),
        attachment: serenity::CreateAttachment::bytes(data, name),
    })
}

pub async fn attach_path(path: impl AsRef<Path>) -> Result<Attached, BotError> {
    attach(FileSource::Path(path.as_ref().to_path_buf()), None).await
}

/// Cut `text` to at most `max` characters, ending in `...` when shortened
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(&".".repeat(max.min(3)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_come_from_paths_or_arguments() {
        let path = FileSource::Path(PathBuf::from("res/images/error.png"));
        assert_eq!(attachment_name(&path, None).unwrap(), "error.png");
        assert_eq!(attachment_name(&path, Some("other.png")).unwrap(), "other.png");

        let bytes = FileSource::Bytes(b"log".to_vec());
        assert_eq!(attachment_name(&bytes, Some("log.txt")).unwrap(), "log.txt");
        assert!(matches!(attachment_name(&bytes, None), Err(BotError::Value(_))));
        assert!(matches!(attachment_name(&bytes, Some("")), Err(BotError::Value(_))));
    }

    #[tokio::test]
    async fn attach_reads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, b"png").unwrap();

        let attached = attach_path(&path).await.unwrap();
        assert_eq!(attached.url, "attachment://image.png");
        assert_eq!(attached.attachment.filename, "image.png");
        assert_eq!(attached.attachment.data, b"png");
    }

    #[test]
    fn truncate_respects_the_limit() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("abc", 2), "..");
    }
}
