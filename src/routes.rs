use axum::{middleware, routing::get, Router};

use crate::auth;
use crate::handlers;
use crate::AppState;

/// Create the application router.
///
/// Route order matters only for readability; the static routes always win
/// over the catch-all. The credential gate wraps every route, including the
/// stylesheet, and is a no-op when no credentials are configured.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/find_file", get(handlers::find_file))
        .route("/highlight.css", get(handlers::highlight_css))
        .route("/", get(handlers::serve_root))
        .route("/*path", get(handlers::serve_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::Credentials;
    use crate::config::Config;
    use crate::git::{ChangeLog, DiffOutput};
    use crate::render;

    struct FailingChangeLog;

    impl ChangeLog for FailingChangeLog {
        fn latest_change(&self, _work_dir: &Path, _file_name: &str) -> io::Result<DiffOutput> {
            Ok(DiffOutput {
                stdout: String::new(),
                stderr: "fatal: not a git repository".to_string(),
                success: false,
            })
        }
    }

    struct FixedChangeLog;

    impl ChangeLog for FixedChangeLog {
        fn latest_change(&self, _work_dir: &Path, _file_name: &str) -> io::Result<DiffOutput> {
            Ok(DiffOutput {
                stdout: "--- a/a.txt\n+++ b/a.txt\n+hello\n".to_string(),
                stderr: String::new(),
                success: true,
            })
        }
    }

    fn fixture_root() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "hello").unwrap();
        std::fs::write(temp.path().join("readme.md"), "# Title\n").unwrap();
        std::fs::write(temp.path().join("main.rs"), "fn main() {}\n").unwrap();
        std::fs::write(temp.path().join("blob.weird"), [0xff_u8, 0xfe, 0x00, 0x01]).unwrap();
        std::fs::create_dir_all(temp.path().join("docs")).unwrap();
        std::fs::write(temp.path().join("docs/readme.md"), "# Docs\n").unwrap();
        temp
    }

    fn state_for(root: &TempDir, changelog: Arc<dyn ChangeLog>) -> AppState {
        AppState {
            root_dir: root.path().canonicalize().unwrap(),
            config: Arc::new(Config::default()),
            credentials: None,
            changelog,
            stylesheet: Arc::new(render::theme_css("base16-ocean.dark").unwrap()),
        }
    }

    async fn get_response(app: Router, uri: &str) -> (StatusCode, Vec<(String, String)>, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body.to_vec())
    }

    fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(header_name, _)| header_name == name)
            .map(|(_, value)| value.as_str())
    }

    #[tokio::test]
    async fn traversal_is_rejected_with_400() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, _, body) = get_response(app, "/../etc/passwd").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Invalid path");
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, _, body) = get_response(app, "/missing.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"File does not exist");
    }

    #[tokio::test]
    async fn raw_view_streams_plain_text() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, headers, body) = get_response(app, "/a.txt?raw=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(header_value(&headers, "content-type"), Some("text/plain"));
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn root_listing_shows_files_and_directories() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, _, body) = get_response(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("a.txt"));
        assert!(page.contains("docs/"));
    }

    #[tokio::test]
    async fn find_file_redirects_to_first_match() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, headers, _) =
            get_response(app, "/find_file?parent_dir=docs&filename=readme.md").await;
        assert!(status.is_redirection());
        assert_eq!(header_value(&headers, "location"), Some("/docs/readme.md"));
    }

    #[tokio::test]
    async fn find_file_without_parameters_is_400() {
        let root = fixture_root();
        let state = state_for(&root, Arc::new(FailingChangeLog));

        let (status, _, _) =
            get_response(router(state.clone()), "/find_file?filename=readme.md").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = get_response(router(state), "/find_file?parent_dir=docs").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn find_file_without_match_is_404() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, _, body) =
            get_response(app, "/find_file?parent_dir=docs&filename=nope.md").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"File does not exist");
    }

    #[tokio::test]
    async fn markdown_renders_as_html() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, _, body) = get_response(app, "/readme.md").await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("<h1>"));
        assert!(page.contains("Title"));
    }

    #[tokio::test]
    async fn source_file_renders_highlighted_with_navigation() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, _, body) = get_response(app, "/main.rs").await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("<pre class=\"highlight\">"));
        assert!(page.contains("<nav>"));
    }

    #[tokio::test]
    async fn unhighlightable_unknown_extension_falls_back_to_raw() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, headers, body) = get_response(app, "/blob.weird").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(header_value(&headers, "content-type"), Some("text/plain"));
        assert_eq!(body, vec![0xff_u8, 0xfe, 0x00, 0x01]);
    }

    #[tokio::test]
    async fn diff_failure_surfaces_collaborator_stderr() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, _, body) = get_response(app, "/a.txt?show_diff=true").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = String::from_utf8(body).unwrap();
        assert!(body.starts_with("`git diff` error: "));
        assert!(body.contains("fatal: not a git repository"));
    }

    #[tokio::test]
    async fn diff_success_renders_highlighted_page() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FixedChangeLog)));

        let (status, _, body) = get_response(app, "/a.txt?show_diff=true").await;
        assert_eq!(status, StatusCode::OK);
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("<pre class=\"highlight\">"));
        assert!(page.contains("<nav>"));
    }

    #[tokio::test]
    async fn stylesheet_is_served_as_css() {
        let root = fixture_root();
        let app = router(state_for(&root, Arc::new(FailingChangeLog)));

        let (status, headers, body) = get_response(app, "/highlight.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(header_value(&headers, "content-type"), Some("text/css"));
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn credential_gate_challenges_and_admits() {
        let root = fixture_root();
        let mut state = state_for(&root, Arc::new(FailingChangeLog));
        state.credentials = Some(Arc::new(Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        }));

        let (status, headers, _) = get_response(router(state.clone()), "/").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            header_value(&headers, "www-authenticate"),
            Some("Basic realm=\"Restricted Area\"")
        );

        // "user:pass"
        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
