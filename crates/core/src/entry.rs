use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "ico"];

pub fn is_supported_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| extension.eq_ignore_ascii_case(supported))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("ファイルではありません: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("拡張子がありません: {}", .0.display())]
    MissingExtension(PathBuf),
    #[error("対応していない拡張子です: {}", .0.display())]
    UnsupportedExtension(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
    pub extension: String,
    pub modified: Option<DateTime<Local>>,
}

impl FileEntry {
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        if !path.is_file() {
            return Err(ImportError::NotAFile(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|v| v.to_str())
            .map(str::to_string)
            .ok_or_else(|| ImportError::MissingExtension(path.to_path_buf()))?;
        if !is_supported_extension(&extension) {
            return Err(ImportError::UnsupportedExtension(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());
        let stem = path
            .file_stem()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            stem,
            extension,
            modified: file_modified_to_local(path),
        })
    }

    pub fn canonical_extension(&self) -> String {
        self.extension.to_ascii_lowercase()
    }
}

fn file_modified_to_local(path: &Path) -> Option<DateTime<Local>> {
    let time = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::from(time))
}
