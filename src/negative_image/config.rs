use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_MAX_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    pub result_dir: PathBuf,
    pub max_bytes: usize,
    // 小文字、ドットなし
    pub allowed_extensions: BTreeSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3300)),
            upload_dir: PathBuf::from("static/uploads"),
            result_dir: PathBuf::from("static/results"),
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    // NEGATIVE_* 環境変数で上書き。パースできない値は無視する
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("NEGATIVE_BIND_ADDR") {
            match val.parse::<SocketAddr>() {
                Ok(addr) => self.bind_addr = addr,
                Err(e) => log::warn!("ignoring NEGATIVE_BIND_ADDR={:?}: {}", val, e),
            }
        }
        if let Some(val) = lookup("NEGATIVE_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("NEGATIVE_RESULT_DIR") {
            self.result_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("NEGATIVE_MAX_BYTES") {
            match val.parse::<usize>() {
                Ok(bytes) => self.max_bytes = bytes,
                Err(e) => log::warn!("ignoring NEGATIVE_MAX_BYTES={:?}: {}", val, e),
            }
        }
        if let Some(val) = lookup("NEGATIVE_ALLOWED_EXTENSIONS") {
            let extensions = parse_extensions(&val);
            if extensions.is_empty() {
                log::warn!("ignoring empty NEGATIVE_ALLOWED_EXTENSIONS");
            } else {
                self.allowed_extensions = extensions;
            }
        }
        self
    }
}

// "PNG, .jpg,,gif" -> {gif, jpg, png}
pub fn parse_extensions(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
