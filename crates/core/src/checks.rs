use crate::entry::is_supported_extension;
use thiserror::Error;

const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameViolation {
    #[error("ファイル名が空です")]
    Empty,
    #[error("ファイル名が拡張子のみです")]
    ExtensionOnly,
    #[error("使用できない文字が含まれています: {0:?}")]
    DisallowedChar(char),
    #[error("末尾にスペースまたはドットがあります")]
    TrailingDotOrSpace,
    #[error("Windows予約名です: {0}")]
    ReservedName(String),
    #[error("対応している拡張子で終わっていません")]
    UnsupportedExtension,
}

pub fn check_file_name(name: &str) -> Option<NameViolation> {
    if name.is_empty() {
        return Some(NameViolation::Empty);
    }

    for ch in name.chars() {
        if is_disallowed_char(ch) {
            return Some(NameViolation::DisallowedChar(ch));
        }
    }

    if name.ends_with(' ') || name.ends_with('.') {
        return Some(NameViolation::TrailingDotOrSpace);
    }

    let stem = name.split('.').next().unwrap_or(name);
    if stem.is_empty() {
        return Some(NameViolation::ExtensionOnly);
    }
    if is_windows_reserved(stem) {
        return Some(NameViolation::ReservedName(stem.to_string()));
    }

    match name.rsplit_once('.') {
        Some((_, extension)) if is_supported_extension(extension) => None,
        _ => Some(NameViolation::UnsupportedExtension),
    }
}

fn is_disallowed_char(ch: char) -> bool {
    matches!(ch, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
        || ch == '\0'
        || ch.is_control()
}

fn is_windows_reserved(stem: &str) -> bool {
    let upper = stem.to_ascii_uppercase();
    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| reserved == &upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_supported_name() {
        assert_eq!(check_file_name("2021-03-05_IMG_0001.jpg"), None);
        assert_eq!(check_file_name("photo.PNG"), None);
    }

    #[test]
    fn rejects_path_separators_and_reserved_chars() {
        assert_eq!(
            check_file_name("a/b.png"),
            Some(NameViolation::DisallowedChar('/'))
        );
        assert_eq!(
            check_file_name("a:b.png"),
            Some(NameViolation::DisallowedChar(':'))
        );
    }

    #[test]
    fn rejects_windows_reserved_stems() {
        assert_eq!(
            check_file_name("aux.png"),
            Some(NameViolation::ReservedName("aux".to_string()))
        );
        assert_eq!(
            check_file_name("COM1.jpg"),
            Some(NameViolation::ReservedName("COM1".to_string()))
        );
    }

    #[test]
    fn rejects_extension_only_names() {
        assert_eq!(check_file_name(".png"), Some(NameViolation::ExtensionOnly));
    }

    #[test]
    fn rejects_unsupported_extension() {
        assert_eq!(
            check_file_name("photo.tiff"),
            Some(NameViolation::UnsupportedExtension)
        );
        assert_eq!(
            check_file_name("photo"),
            Some(NameViolation::UnsupportedExtension)
        );
    }

    #[test]
    fn rejects_trailing_dot_or_space() {
        assert_eq!(
            check_file_name("photo.png "),
            Some(NameViolation::TrailingDotOrSpace)
        );
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(check_file_name(""), Some(NameViolation::Empty));
    }
}
