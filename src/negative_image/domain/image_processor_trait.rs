use crate::infrastructure::error::InfrastructureError;
use image::ImageFormat as InnerImageFormat;
use std::path::{Path, PathBuf};

// バイト列を受け取り、ネガ反転したバイト列とその出力フォーマットを返す
#[cfg_attr(test, mockall::automock)]
pub trait ImageProcessor {
    // input_format_opt が None ならバイト列から推測、output_format_opt が None なら入力と同じ
    fn invert_image(
        &self,
        image_bytes: Vec<u8>,
        input_format_opt: Option<InnerImageFormat>,
        output_format_opt: Option<InnerImageFormat>,
    ) -> Result<(Vec<u8>, InnerImageFormat), InfrastructureError>;

    // パス版。出力フォーマットは destination の拡張子で決まる
    // エンコードが終わってから書き込むので、失敗時は destination を作らない
    fn invert_file(&self, source: &Path, destination: &Path) -> Result<PathBuf, InfrastructureError> {
        let output_format = InnerImageFormat::from_path(destination)
            .map_err(|_| InfrastructureError::UnknownOutputFormat(destination.display().to_string()))?;
        let image_bytes = std::fs::read(source)?;

        let (encoded, _) = self.invert_image(image_bytes, None, Some(output_format))?;
        std::fs::write(destination, encoded)?;

        log::debug!("inverted {} -> {}", source.display(), destination.display());
        Ok(destination.to_path_buf())
    }
}
