use crate::application::error::ApplicationError;
use crate::application::negative_service::NegativeService;
use crate::config::Config;
use crate::domain::upload::UploadRecord;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, header::HeaderName, Method},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub negative_service: Arc<NegativeService>,
}

// /api/invert のクエリパラメータ
#[derive(Deserialize, Debug)]
pub struct InvertParams {
    #[serde(rename = "outputFormat")]
    pub output_format: Option<String>,
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Negative Image</title></head>
<body>
  <h1>Negative Image</h1>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="file" accept=".png,.jpg,.jpeg,.gif">
    <button type="submit">Invert</button>
  </form>
</body>
</html>
"#;

// 保存名は [A-Za-z0-9_.-] のみなのでエスケープ不要
pub fn render_result_page(record: &UploadRecord) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Negative Image</title></head>
<body>
  <h1>Result</h1>
  <div style="display:flex;gap:2em">
    <figure><img src="/uploads/{original}" alt="original"><figcaption>Original</figcaption></figure>
    <figure><img src="/results/{result}" alt="negative"><figcaption>Negative</figcaption></figure>
  </div>
  <p>Processed at {created}</p>
  <a href="/">Upload another image</a>
</body>
</html>
"#,
        original = record.stored_name,
        result = record.result_name,
        created = record.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(vec![HeaderName::from_static("content-type")]);

    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload_image_handler))
        .route("/api/invert", post(invert_image_handler))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .nest_service("/results", ServeDir::new(&config.result_dir))
        .layer(DefaultBodyLimit::max(config.max_bytes))
        .layer(cors)
        .with_state(state)
}

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

// `file` フィールドのファイル名とバイト列を取り出す。他のフィールドは読み飛ばす
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<(String, Vec<u8>)>, ApplicationError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok(Some((filename, data.to_vec())));
    }
    Ok(None)
}

pub async fn upload_image_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApplicationError> {
    let Some((filename, data)) = read_file_field(&mut multipart).await? else {
        return Ok(Redirect::to("/").into_response());
    };
    if filename.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let record = state.negative_service.process_upload(&filename, data).await?;
    log::info!(
        "{} -> {}",
        record.original_path.display(),
        record.result_path.display()
    );
    Ok(Html(render_result_page(&record)).into_response())
}

pub async fn invert_image_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InvertParams>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApplicationError> {
    let (_, data) = read_file_field(&mut multipart).await?.ok_or(ApplicationError::MissingFile)?;

    let inverted = state
        .negative_service
        .invert_bytes(data, params.output_format.as_deref())
        .await?;

    Response::builder()
        .header(header::CONTENT_TYPE, inverted.content_type)
        .body(Body::from(inverted.bytes))
        .map_err(|e| ApplicationError::from(anyhow::Error::from(e)))
}
