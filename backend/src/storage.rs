//! Image files on local disk, served back under `/uploads`.

use std::fs;
use std::path::PathBuf;

use actix_files::Files;
use async_trait::async_trait;
use common::error::GatewayError;
use common::gateway::ObjectStorage;
use log::info;
use regex::Regex;

pub const PUBLIC_PREFIX: &str = "/uploads";

pub struct LocalStorage {
    root: PathBuf,
    path_re: Regex,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, regex::Error> {
        Ok(LocalStorage {
            root: root.into(),
            // Segments start with an alphanumeric, so `..` can never appear.
            path_re: Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*(/[A-Za-z0-9][A-Za-z0-9._-]*)*$")?,
        })
    }

    pub fn is_valid_path(&self, path: &str) -> bool {
        path.len() <= 255 && self.path_re.is_match(path)
    }

    /// Serves stored files.
    pub fn files_service(&self) -> Files {
        Files::new(PUBLIC_PREFIX, &self.root)
    }
}

/// `<md5 of bytes>.<extension>` for uploads that come without a path.
pub fn content_addressed_path(digest: &str, content_type: &str) -> String {
    let extension = mime_guess::get_mime_extensions_str(content_type)
        .and_then(|exts| exts.first().copied())
        .unwrap_or("bin");
    format!("{}.{}", digest, extension)
}

#[async_trait(?Send)]
impl ObjectStorage for LocalStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        if !self.is_valid_path(path) {
            return Err(GatewayError::Conflict(format!("invalid upload path `{}`", path)));
        }
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| GatewayError::Backend(e.to_string()))?;
        }
        fs::write(&target, &bytes).map_err(|e| GatewayError::Backend(e.to_string()))?;
        info!("stored {} ({} bytes, {})", path, bytes.len(), content_type);
        Ok(format!("{}/{}", PUBLIC_PREFIX, path))
    }
}
