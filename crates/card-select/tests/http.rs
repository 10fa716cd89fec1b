mod common;

use std::sync::Arc;

use common::RecordingNotifier;
use http::StatusCode;
use manos_card_select::{
    Affordance, CardSelectConfig, CardServices, FileRef, FileTransferAgent, HttpFileTransfer,
    HttpOptionSource, ItemArgs, ItemId, ItemStateCoordinator, LinkVariant, LocalFile, NoToken,
    RemoteError, RemoteOptionSource, RenameRequest, RequestContext, StaticToken, UploadOutcome,
};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> CardSelectConfig {
    CardSelectConfig::from_json(Some(&json!({
        "baseUrl": server.uri(),
        "additionalRequestHeaders": { "X-Site": "main" },
        "additionalRequestData": { "lang": "en" }
    })))
}

fn source(server: &MockServer) -> HttpOptionSource {
    let config = config(server);
    HttpOptionSource::new(
        Client::new(),
        RequestContext::from_config(&config),
        config.endpoint.clone(),
        config.endpoint_one.clone(),
    )
}

fn transfer(server: &MockServer, token: &str) -> HttpFileTransfer {
    let config = config(server);
    HttpFileTransfer::new(
        Client::new(),
        RequestContext::from_config(&config),
        config.upload_endpoint.clone(),
        config.rename_endpoint.clone(),
        Arc::new(StaticToken(token.to_string())),
    )
}

#[tokio::test]
async fn search_sends_query_params_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/ajax-blog-list"))
        .and(query_param("q", "rust"))
        .and(query_param("lang", "en"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(header("X-Site", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": 7, "text": "Rust in production" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = source(&server).search("rust").await.unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].id, "7");
    assert_eq!(options[0].text, "Rust in production");
}

#[tokio::test]
async fn default_options_accept_a_bare_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/ajax-blog-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "text": "One" },
            { "id": "2", "text": "Two" }
        ])))
        .mount(&server)
        .await;

    let options = source(&server).default_options().await.unwrap();
    let ids: Vec<_> = options.iter().map(|option| option.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn fetch_by_id_reads_the_success_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/ajax-blog-by-id"))
        .and(query_param("id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "id": 7, "text": "Seven" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/ajax-blog-by-id"))
        .and(query_param("id", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/ajax-blog-by-id"))
        .and(query_param("id", "9"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = source(&server);
    let found = source.fetch_by_id("7").await.unwrap().unwrap();
    assert_eq!(found.text, "Seven");
    assert_eq!(source.fetch_by_id("8").await.unwrap(), None);
    assert!(matches!(
        source.fetch_by_id("9").await,
        Err(RemoteError::Status(StatusCode::INTERNAL_SERVER_ERROR))
    ));
}

#[tokio::test]
async fn malformed_bodies_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        source(&server).search("x").await,
        Err(RemoteError::Malformed(_))
    ));
}

#[tokio::test]
async fn upload_sends_csrf_token_and_reads_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/file"))
        .and(header("X-CSRF-Token", "secret"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_string_contains("filename=\"report.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "id": 42, "name": "report.pdf", "url": "/files/report.pdf" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uploaded = transfer(&server, "secret")
        .upload(&LocalFile::new("report.pdf", b"%PDF-1.4".to_vec()))
        .await
        .unwrap();
    assert_eq!(uploaded.id.as_deref(), Some("42"));
    assert_eq!(uploaded.extension.as_deref(), Some("pdf"));
    assert_eq!(uploaded.size, Some(8));
    assert!(!uploaded.is_local_only);
}

#[tokio::test]
async fn upload_accepts_a_bare_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "url": "/files/notes.txt"
        })))
        .mount(&server)
        .await;

    let uploaded = transfer(&server, "")
        .upload(&LocalFile::new("notes.txt", b"hello".to_vec()))
        .await
        .unwrap();
    assert_eq!(uploaded.name, "notes.txt");
    assert_eq!(uploaded.url, "/files/notes.txt");
    assert!(!uploaded.has_server_id());
}

#[tokio::test]
async fn rejected_upload_carries_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "too large"
        })))
        .mount(&server)
        .await;

    let result = transfer(&server, "t")
        .upload(&LocalFile::new("a.zip", vec![0; 4]))
        .await;
    assert!(matches!(result, Err(RemoteError::Rejected(message)) if message == "too large"));
}

#[tokio::test]
async fn failing_upload_server_leaves_a_local_preview() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/file"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let item = ItemStateCoordinator::initialize(ItemArgs::new(
        ItemId(1),
        LinkVariant::File,
        Arc::new(transfer(&server, "t")),
        Arc::new(RecordingNotifier::default()),
    ));
    let outcome = item
        .upload_file(LocalFile::new("photo.png", vec![1, 2, 3]))
        .await;

    let file = match outcome {
        UploadOutcome::LocalOnly(file) => file,
        other => panic!("expected a local preview, got {other:?}"),
    };
    assert!(file.is_local_only);
    assert_eq!(file.size, Some(3));
    assert!(item.is_disabled(Affordance::Reference));
    assert!(item.is_disabled(Affordance::CustomUrl));
    assert!(!item.is_disabled(Affordance::File));
}

#[tokio::test]
async fn rename_reads_envelope_and_bare_files() {
    let server = MockServer::start().await;
    let file = FileRef::new("old.pdf", "/files/old.pdf").id("5").size(10);

    Mock::given(method("PUT"))
        .and(path("/upload/rename"))
        .and(body_json(json!({
            "id": "5", "name": "new", "extension": "pdf", "url": "/files/old.pdf", "size": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "id": "5", "name": "new.pdf", "url": "/files/new.pdf", "size": 10 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/rename"))
        .and(body_json(json!({
            "id": "5", "name": "bare", "extension": "pdf", "url": "/files/old.pdf", "size": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "bare.pdf", "url": "/files/bare.pdf"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/rename"))
        .and(body_json(json!({
            "id": "5", "name": "taken", "extension": "pdf", "url": "/files/old.pdf", "size": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "name taken"
        })))
        .mount(&server)
        .await;

    let transfer = transfer(&server, "t");
    let renamed = transfer
        .rename(&RenameRequest::for_file(&file, "new"))
        .await
        .unwrap();
    assert_eq!(renamed.url, "/files/new.pdf");

    let bare = transfer
        .rename(&RenameRequest::for_file(&file, "bare"))
        .await
        .unwrap();
    assert_eq!(bare.name, "bare.pdf");
    assert_eq!(bare.id.as_deref(), Some("5"));

    assert!(matches!(
        transfer.rename(&RenameRequest::for_file(&file, "taken")).await,
        Err(RemoteError::Rejected(message)) if message == "name taken"
    ));
}

#[tokio::test]
async fn http_services_cover_every_link_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/list"))
        .and(query_param("q", "today"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "n1", "text": "Today" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = CardSelectConfig::from_json(Some(&json!({
        "baseUrl": server.uri(),
        "configurableTypes": [
            { "key": "news", "buttonLabel": "News", "endpoint": "/news/list", "endpointOne": "/news/one" },
            { "key": "event", "buttonLabel": "Event" }
        ]
    })));
    let services = CardServices::http(Client::new(), &config, Arc::new(NoToken));

    assert!(services.source("event").is_some());
    assert!(services.source("blog").is_none());
    let news = services.source("news").unwrap();
    let options = news.search("today").await.unwrap();
    assert_eq!(options[0].text, "Today");
}

#[tokio::test]
async fn relative_endpoints_need_a_base_url() {
    let config = CardSelectConfig::from_json(None);
    let source = HttpOptionSource::new(
        Client::new(),
        RequestContext::from_config(&config),
        config.endpoint.clone(),
        config.endpoint_one.clone(),
    );
    assert!(matches!(
        source.default_options().await,
        Err(RemoteError::Endpoint { .. })
    ));
}
