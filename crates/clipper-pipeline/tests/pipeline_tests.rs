//! End-to-end pipeline tests against a local HTTP fixture server

use clipper_pipeline::{Clipper, PipelineConfig};
use clipper_types::ClipperError;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// A pipeline wired to a rule directory holding the given files.
fn clipper_with_rules(files: &[(&str, &str)]) -> (Clipper, TempDir) {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    let mut config = PipelineConfig::default();
    config.config_builder.directories = vec![PathBuf::from(dir.path())];
    (Clipper::new(config).unwrap(), dir)
}

/// Rule filename for the mock server's host (e.g. `127.0.0.1.txt`).
fn rules_for(server: &MockServer, content: &str) -> (&'static str, String) {
    let host = url::Url::parse(&server.uri())
        .unwrap()
        .host_str()
        .unwrap()
        .to_string();
    // leak: test-lifetime string used as a filename key
    let name = Box::leak(format!("{host}.txt").into_boxed_str());
    (name, content.to_string())
}

#[tokio::test]
async fn directives_drive_title_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_response(
            "<html><body><h1>X</h1><article><p>Y</p></article></body></html>",
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(&server, "title: //h1\nbody: //article\n");
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/a", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status, 200);
    assert_eq!(result.title.as_deref(), Some("X"));
    assert!(result.html.contains("<p>Y</p>"));
    assert_eq!(result.url, format!("{}/a", server.uri()));
    assert_eq!(result.content_type.as_deref(), Some("text/html"));
}

#[tokio::test]
async fn feed_scheme_is_rewritten_to_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_response(
            "<html><body><h1>X</h1><article><p>Y</p></article></body></html>",
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(&server, "title: //h1\nbody: //article\n");
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let feed_url = format!("{}/a", server.uri()).replace("http://", "feed://");
    let result = clipper.fetch_content(&feed_url).await.unwrap();
    assert_eq!(result.title.as_deref(), Some("X"));
    assert_eq!(result.url, format!("{}/a", server.uri()));
}

#[tokio::test]
async fn pdf_responses_become_download_stubs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 not really".to_vec()),
        )
        .mount(&server)
        .await;

    let (clipper, _dir) = clipper_with_rules(&[]);
    let url = format!("{}/doc.pdf", server.uri());
    let result = clipper.fetch_content(&url).await.unwrap();

    assert_eq!(result.status, 200);
    assert_eq!(
        result.html,
        format!("<a href=\"{url}\">Download PDF</a>")
    );
    assert_eq!(result.content_type.as_deref(), Some("application/pdf"));
}

#[tokio::test]
async fn blocked_urls_fail_with_policy_error() {
    let mut config = PipelineConfig::default();
    config.blocked_urls = vec!["tracker.example".to_string()];
    let clipper = Clipper::new(config).unwrap();

    let err = clipper
        .fetch_content("http://ads.tracker.example/x")
        .await
        .unwrap_err();
    assert!(matches!(err, ClipperError::PolicyBlocked(_)));
}

#[tokio::test]
async fn excluded_content_types_fail_with_policy_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/octet-stream")
                .set_body_bytes(vec![0u8; 16]),
        )
        .mount(&server)
        .await;

    let mut config = PipelineConfig::default();
    config.content_type_exc.insert(
        "application/octet-stream".to_string(),
        clipper_extraction::DispatchEntry {
            action: clipper_types::MimeAction::Exclude,
            name: "binary".to_string(),
        },
    );
    let clipper = Clipper::new(config).unwrap();

    let err = clipper
        .fetch_content(&format!("{}/bin", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClipperError::PolicyBlocked(_)));
}

#[tokio::test]
async fn multi_page_articles_are_stitched_together() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/1"))
        .respond_with(html_response(
            r#"<html><body><h1>T</h1><article><p>page one</p></article>
            <a rel="next" href="/a/2">2</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a/2"))
        .respond_with(html_response(
            r#"<html><body><article><p>page two</p></article>
            <a rel="next" href="/a/3">3</a></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a/3"))
        .respond_with(html_response(
            r#"<html><body><article><p>page three</p></article></body></html>"#,
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(
        &server,
        "title: //h1\nbody: //article\nnext_page_link: //a[@rel='next']/@href\n",
    );
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/a/1", server.uri()))
        .await
        .unwrap();

    assert!(result.html.contains("page one"));
    assert!(result.html.contains("page two"));
    assert!(result.html.contains("page three"));
    // clean termination, no truncation note
    assert!(!result.html.contains("could not be retrieved"));
}

#[tokio::test]
async fn next_page_loops_truncate_instead_of_spinning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/1"))
        .respond_with(html_response(
            r#"<html><body><article><p>page one</p></article>
            <a rel="next" href="/a/1">again</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(
        &server,
        "body: //article\nnext_page_link: //a[@rel='next']/@href\n",
    );
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/a/1", server.uri()))
        .await
        .unwrap();

    assert!(result.html.contains("page one"));
    assert!(result.html.contains("could not be retrieved"));
}

#[tokio::test]
async fn single_page_link_promotes_the_print_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_response(
            r#"<html><head><link rel="print" href="/print/a"></head>
            <body><article><p>split view</p></article></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/print/a"))
        .respond_with(html_response(
            r#"<html><body><h1>Full</h1><article><p>whole article</p></article></body></html>"#,
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(
        &server,
        "title: //h1\nbody: //article\nsingle_page_link: //link[@rel='print']/@href\n",
    );
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/a", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.url, format!("{}/print/a", server.uri()));
    assert!(result.html.contains("whole article"));
    assert!(!result.html.contains("split view"));
}

#[tokio::test]
async fn comment_only_rules_fall_back_to_heuristics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post"))
        .respond_with(html_response(
            r#"<html><head><title>Heuristic Wins</title></head><body>
            <nav><a href="/">home</a></nav>
            <div id="content">
            <p>The heuristic extractor needs a reasonable amount of prose to
               identify this container as the article body of the page.</p>
            <p>So this fixture carries several sentences of filler content,
               just like a real article would.</p>
            </div></body></html>"#,
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(&server, "# curated rules pending\n");
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/post", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status, 200);
    assert!(result.html.contains("reasonable amount of prose"));
    assert_eq!(result.title.as_deref(), Some("Heuristic Wins"));
}

#[tokio::test]
async fn failed_extraction_returns_error_message_with_observed_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("Content-Type", "text/html")
                .set_body_string("<html><body></body></html>"),
        )
        .mount(&server)
        .await;

    let (name, content) = rules_for(&server, "body: //article\nautodetect_on_failure: no\n");
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/gone", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status, 404);
    assert_eq!(result.html, "[unable to retrieve full-text content]");
}

#[tokio::test]
async fn open_graph_properties_are_collected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/og"))
        .respond_with(html_response(
            r#"<html><head>
            <meta property="og:title" content="OG Title">
            <meta property="og:type" content="article">
            </head><body><article><p>x</p></article></body></html>"#,
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(&server, "body: //article\n");
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/og", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        result.open_graph.get("og_title").map(String::as_str),
        Some("OG Title")
    );
    assert_eq!(
        result.open_graph.get("og_type").map(String::as_str),
        Some("article")
    );
}

#[tokio::test]
async fn find_replace_directives_rewrite_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fr"))
        .respond_with(html_response(
            "<html><body><article><div class=\"gallery\">PHOTOS</div><p>text</p></article></body></html>",
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(
        &server,
        "body: //article\nreplace_string(PHOTOS): GALLERY\n",
    );
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/fr", server.uri()))
        .await
        .unwrap();

    assert!(result.html.contains("GALLERY"));
    assert!(!result.html.contains("PHOTOS"));
}

#[tokio::test]
async fn http_header_directives_reach_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/h"))
        .and(wiremock::matchers::header("x-forwarded-for", "66.249.66.1"))
        .respond_with(html_response(
            "<html><body><article><p>served</p></article></body></html>",
        ))
        .mount(&server)
        .await;

    let (name, content) = rules_for(
        &server,
        "body: //article\nhttp_header(X-Forwarded-For): 66.249.66.1\n",
    );
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/h", server.uri()))
        .await
        .unwrap();
    assert!(result.html.contains("served"));
}

#[tokio::test]
async fn summary_is_word_capped_text() {
    let server = MockServer::start().await;
    let long_body: String = (0..80)
        .map(|i| format!("word{i} "))
        .collect::<String>();
    Mock::given(method("GET"))
        .and(path("/long"))
        .respond_with(html_response(&format!(
            "<html><body><article><p>{long_body}</p></article></body></html>"
        )))
        .mount(&server)
        .await;

    let (name, content) = rules_for(&server, "body: //article\n");
    let (clipper, _dir) = clipper_with_rules(&[(name, &content)]);

    let result = clipper
        .fetch_content(&format!("{}/long", server.uri()))
        .await
        .unwrap();

    let summary = result.summary.unwrap();
    assert!(summary.ends_with('…'));
    assert_eq!(summary.split_whitespace().count(), 55);
}
