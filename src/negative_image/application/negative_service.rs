use std::collections::BTreeSet;
use std::sync::Arc;
use super::error::ApplicationError;
use chrono::Local;
use image::ImageFormat as InnerImageFormat;

use crate::config::Config;
use crate::domain::error::DomainError;
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::upload::{self, UploadRecord};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::file_storage::LocalFileStorage;

#[derive(Debug)]
pub struct InvertedImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

pub struct NegativeService {
    image_processor: Arc<dyn ImageProcessor + Send + Sync>, // トレイトオブジェクトとして保持
    storage: LocalFileStorage,
    allowed_extensions: BTreeSet<String>,
}

impl NegativeService {
    pub fn new(
        image_processor: Arc<dyn ImageProcessor + Send + Sync>,
        storage: LocalFileStorage,
        config: &Config,
    ) -> Self {
        Self {
            image_processor,
            storage,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    fn map_format_str_to_enum(&self, format_str: &str) -> Option<InnerImageFormat> {
        match format_str.to_lowercase().as_str() {
            "jpeg" | "jpg" => Some(InnerImageFormat::Jpeg),
            "png" => Some(InnerImageFormat::Png),
            "gif" => Some(InnerImageFormat::Gif),
            other => InnerImageFormat::from_extension(other),
        }
    }

    fn content_type(format: InnerImageFormat) -> &'static str {
        match format {
            InnerImageFormat::Png => "image/png",
            InnerImageFormat::Jpeg => "image/jpeg",
            InnerImageFormat::Gif => "image/gif",
            InnerImageFormat::WebP => "image/webp",
            InnerImageFormat::Bmp => "image/bmp",
            InnerImageFormat::Tiff => "image/tiff",
            _ => "application/octet-stream",
        }
    }

    // 許可リストとサニタイズ後のファイル名を検証する
    pub fn validate_filename(&self, filename: &str) -> Result<String, DomainError> {
        if !upload::is_allowed(filename, &self.allowed_extensions) {
            return Err(DomainError::InvalidFileType(filename.to_string()));
        }

        // サニタイズで拡張子が消える場合も不正なファイル名として扱う
        let secure_name = upload::secure_filename(filename);
        if !upload::is_allowed(&secure_name, &self.allowed_extensions) {
            return Err(DomainError::InvalidFileType(filename.to_string()));
        }
        Ok(secure_name)
    }

    // 原画像を保存してから反転結果を書き出す。失敗時は結果ファイルを作らない (原画像は残す)
    pub async fn process_upload(&self, filename: &str, image_data: Vec<u8>) -> Result<UploadRecord, ApplicationError> {
        let secure_name = self.validate_filename(filename)?;
        let known_format = upload::extension_of(&secure_name)
            .and_then(|ext| self.map_format_str_to_enum(&ext))
            .is_some();
        if !known_format {
            return Err(DomainError::InvalidFileType(filename.to_string()).into());
        }

        let created_at = Local::now();
        let (stored_name, original_path) = self
            .storage
            .save_upload(&upload::timestamped_name(&created_at.naive_local(), &secure_name), &image_data)
            .await?;
        log::info!("staged upload {} ({} bytes)", original_path.display(), image_data.len());

        let (result_name, result_path) = self
            .storage
            .next_result_path(&upload::result_name(&stored_name))
            .await?;

        let image_processor = Arc::clone(&self.image_processor);
        let (source, destination) = (original_path.clone(), result_path.clone());
        let result_path = self
            .run_blocking(move || image_processor.invert_file(&source, &destination))
            .await?;

        Ok(UploadRecord {
            stored_name,
            original_path,
            result_name,
            result_path,
            created_at,
        })
    }

    // 保存せずにメモリ上で反転する。output_format_str が None なら入力と同じフォーマット
    pub async fn invert_bytes(
        &self,
        image_data: Vec<u8>,
        output_format_str: Option<&str>,
    ) -> Result<InvertedImage, ApplicationError> {
        let output_format = match output_format_str {
            Some(format_str) => Some(
                self.map_format_str_to_enum(format_str)
                    .ok_or_else(|| DomainError::InvalidFileType(format_str.to_string()))?,
            ),
            None => None,
        };

        let image_processor = Arc::clone(&self.image_processor);
        let (bytes, format) = self
            .run_blocking(move || image_processor.invert_image(image_data, None, output_format))
            .await?;
        Ok(InvertedImage {
            bytes,
            content_type: Self::content_type(format),
        })
    }

    // CPU を使う処理なので blocking スレッドで実行する。panic も処理失敗として扱う
    async fn run_blocking<T, F>(&self, job: F) -> Result<T, ApplicationError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, InfrastructureError> + Send + 'static,
    {
        tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| ApplicationError::ProcessingFailed(InfrastructureError::TaskFailed(e.to_string())))?
            .map_err(ApplicationError::ProcessingFailed)
    }
}
