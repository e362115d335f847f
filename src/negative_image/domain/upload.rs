use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime};
use unicode_normalization::UnicodeNormalization;

pub const RESULT_PREFIX: &str = "inverted_";

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub stored_name: String,
    pub original_path: PathBuf,
    pub result_name: String,
    pub result_path: PathBuf,
    pub created_at: DateTime<Local>,
}

pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn is_allowed(filename: &str, allowed_extensions: &BTreeSet<String>) -> bool {
    extension_of(filename).map_or(false, |ext| allowed_extensions.contains(&ext))
}

// NFKD で分解してから [A-Za-z0-9_.-] 以外を落とす (café.png -> cafe.png)
// 区切り文字と空白は "_"、先頭末尾の "." "_" は除去するのでディレクトリ外に出られない
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

// 20240102_030405_photo.png
pub fn timestamped_name(created_at: &NaiveDateTime, secure_name: &str) -> String {
    format!("{}_{}", created_at.format("%Y%m%d_%H%M%S"), secure_name)
}

pub fn result_name(stored_name: &str) -> String {
    format!("{}{}", RESULT_PREFIX, stored_name)
}

// a.png -> a_2.png
pub fn with_suffix(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", name, n),
    }
}
