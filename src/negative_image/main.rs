mod application;
mod config;
mod domain;
mod infrastructure;

use anyhow::Context;
use std::sync::Arc;

use crate::application::negative_service::NegativeService;
use crate::config::Config;
use crate::infrastructure::axum_handler::{router, AppState};
use crate::infrastructure::file_storage::LocalFileStorage;
use crate::infrastructure::image_processor::DefaultImageProcessor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::default().with_env_overrides();
    log::debug!("config: {:?}", config);

    // アップロード先と結果の保存先を作成
    let storage = LocalFileStorage::new(&config.upload_dir, &config.result_dir);
    storage.ensure_dirs().await.with_context(|| {
        format!(
            "failed to create {} / {}",
            config.upload_dir.display(),
            config.result_dir.display()
        )
    })?;

    let negative_service = NegativeService::new(Arc::new(DefaultImageProcessor::new()), storage, &config);
    let state = Arc::new(AppState {
        negative_service: Arc::new(negative_service),
    });
    let app = router(state, &config);

    // サーバーの開始
    log::info!("listening on {}", config.bind_addr);
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
