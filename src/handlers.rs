use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    extract::{Path as UrlPath, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tokio::fs;
use tokio::task;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::listing;
use crate::nav::{self, NavigationContext};
use crate::pages;
use crate::paths::{self, Resolved};
use crate::render;
use crate::search;
use crate::AppState;

/// Query flags for the catch-all view route
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub raw: bool,
    #[serde(default)]
    pub show_diff: bool,
}

/// Query parameters for the jump-to-file lookup
#[derive(Debug, Deserialize)]
pub struct FindFileQuery {
    pub parent_dir: Option<String>,
    pub filename: Option<String>,
}

/// How a resolved file is turned into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    Source(String),
    Binary,
    Other(String),
}

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Extension -> language-token table for the recognized-source branch.
///
/// Restricted to syntaxes that ship with syntect's default set: a miss in
/// this branch is a surfaced error, not a fallback.
const LANGUAGES: &[(&str, &str)] = &[
    ("c", "c"),
    ("cc", "c++"),
    ("cpp", "c++"),
    ("css", "css"),
    ("go", "go"),
    ("h", "c"),
    ("hs", "haskell"),
    ("html", "html"),
    ("java", "java"),
    ("js", "javascript"),
    ("json", "json"),
    ("lua", "lua"),
    ("php", "php"),
    ("pl", "perl"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("sh", "bash"),
    ("sql", "sql"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
];

/// Classify a file by extension into its rendering strategy.
pub fn classify(path: &Path, config: &Config) -> FileKind {
    let ext = match path.extension() {
        Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
        // extensionless files get a plain-text rendering attempt
        None => return FileKind::Other("txt".to_string()),
    };

    if MARKDOWN_EXTENSIONS.contains(&ext.as_str()) {
        return FileKind::Markdown;
    }

    if let Some(language) = config.language_overrides.get(&ext) {
        return FileKind::Source(language.clone());
    }

    if let Some((_, language)) = LANGUAGES.iter().find(|(e, _)| *e == ext) {
        return FileKind::Source((*language).to_string());
    }

    if config.is_image_extension(&ext) {
        return FileKind::Binary;
    }

    FileKind::Other(ext)
}

fn join_error(err: tokio::task::JoinError) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        err.to_string(),
    ))
}

fn file_name_of(path: &Path) -> Result<String, AppError> {
    Ok(path
        .file_name()
        .ok_or(AppError::FileNotFound)?
        .to_string_lossy()
        .into_owned())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /find_file - redirect to the first match of a (parent_dir, filename)
/// pair anywhere under the root
pub async fn find_file(
    State(state): State<AppState>,
    Query(query): Query<FindFileQuery>,
) -> Result<Response, AppError> {
    let dir_name = query
        .parent_dir
        .ok_or_else(|| AppError::BadRequest("Missing parameter: parent_dir".to_string()))?;
    let file_name = query
        .filename
        .ok_or_else(|| AppError::BadRequest("Missing parameter: filename".to_string()))?;

    let root = state.root_dir.clone();
    let found = task::spawn_blocking(move || search::find_file(&root, &dir_name, &file_name))
        .await
        .map_err(join_error)?;

    match found {
        Some(relative) => {
            let target = format!("/{}", relative.to_string_lossy());
            debug!("find_file hit: {}", target);
            Ok(Redirect::to(&pages::encode_path(&target)).into_response())
        }
        None => Err(AppError::FileNotFound),
    }
}

/// GET /highlight.css - theme stylesheet, precomputed at startup
pub async fn highlight_css(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/css".to_string())],
        state.stylesheet.as_ref().clone(),
    )
        .into_response()
}

/// GET / - the root directory listing
pub async fn serve_root(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, AppError> {
    serve(state, String::new(), query).await
}

/// GET /*path - directory listing, raw bytes, diff page, or rendered page
pub async fn serve_path(
    State(state): State<AppState>,
    UrlPath(sub_path): UrlPath<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, AppError> {
    serve(state, sub_path, query).await
}

async fn serve(state: AppState, sub_path: String, query: ViewQuery) -> Result<Response, AppError> {
    match paths::resolve(&state.root_dir, &sub_path)? {
        Resolved::Directory(dir) => directory_response(&sub_path, dir).await,
        Resolved::File(file) => {
            if query.raw {
                return raw_response(&file, Some("text/plain")).await;
            }

            let nav = {
                let file = file.clone();
                let root = state.root_dir.clone();
                task::spawn_blocking(move || nav::navigate(&file, &root))
                    .await
                    .map_err(join_error)??
            };

            if query.show_diff {
                diff_response(&state, &file, &nav).await
            } else {
                rendered_response(&state, &file, &nav).await
            }
        }
    }
}

async fn directory_response(sub_path: &str, dir: PathBuf) -> Result<Response, AppError> {
    let listing = task::spawn_blocking(move || listing::split_entries(&dir))
        .await
        .map_err(join_error)??;

    let request_path = if sub_path.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", sub_path.trim_end_matches('/'))
    };

    debug!("listing directory {}", request_path);
    Ok(Html(pages::directory_page(&request_path, &listing)).into_response())
}

/// Stream a file as-is.
///
/// Without an override the content type is guessed from the path; the
/// override is used for raw views and render fallbacks, which are always
/// served as plain text.
async fn raw_response(path: &Path, content_type: Option<&str>) -> Result<Response, AppError> {
    debug!("streaming file: {}", path.display());

    let metadata = fs::metadata(path).await?;
    let file = fs::File::open(path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mime = content_type.map(str::to_string).unwrap_or_else(|| {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string()
    });

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        body,
    )
        .into_response())
}

/// Most recent committed change of the file, highlighted as a diff.
async fn diff_response(
    state: &AppState,
    file: &Path,
    nav: &NavigationContext,
) -> Result<Response, AppError> {
    let work_dir = file.parent().ok_or(AppError::FileNotFound)?.to_path_buf();
    let file_name = file_name_of(file)?;

    let changelog = state.changelog.clone();
    let name = file_name.clone();
    let output = task::spawn_blocking(move || changelog.latest_change(&work_dir, &name))
        .await
        .map_err(join_error)??;

    if !output.success {
        return Err(AppError::DiffUnavailable(output.stderr));
    }

    let markup = task::spawn_blocking(move || render::highlight_code(&output.stdout, "diff"))
        .await
        .map_err(join_error)??;

    Ok(Html(pages::document_page(&file_name, &markup, Some(nav))).into_response())
}

async fn rendered_response(
    state: &AppState,
    file: &Path,
    nav: &NavigationContext,
) -> Result<Response, AppError> {
    let file_name = file_name_of(file)?;

    match classify(file, &state.config) {
        FileKind::Markdown => {
            let bytes = fs::read(file).await?;
            let markup = task::spawn_blocking(move || {
                render::markdown_to_html(&String::from_utf8_lossy(&bytes))
            })
            .await
            .map_err(join_error)?;

            Ok(Html(pages::document_page(&file_name, &markup, None)).into_response())
        }
        FileKind::Source(language) => {
            let bytes = fs::read(file).await?;
            let markup = task::spawn_blocking(move || {
                render::highlight_code(&String::from_utf8_lossy(&bytes), &language)
            })
            .await
            .map_err(join_error)??;

            Ok(Html(pages::document_page(&file_name, &markup, Some(nav))).into_response())
        }
        FileKind::Binary => raw_response(file, None).await,
        FileKind::Other(token) => {
            let bytes = fs::read(file).await?;

            // best effort: an unknown extension must never fail the request
            // while raw passthrough is viable
            let markup = match std::str::from_utf8(&bytes) {
                Ok(code) => {
                    let code = code.to_string();
                    task::spawn_blocking(move || render::highlight_code(&code, &token))
                        .await
                        .map_err(join_error)?
                        .ok()
                }
                Err(_) => None,
            };

            match markup {
                Some(markup) => {
                    Ok(Html(pages::document_page(&file_name, &markup, Some(nav))).into_response())
                }
                None => {
                    debug!("render fallback to raw for {}", file.display());
                    raw_response(file, Some("text/plain")).await
                }
            }
        }
    }
}
