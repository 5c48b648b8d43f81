//! Contract tests for the dog image API client against a mock server.

use dogsh::breed::BreedPath;
use dogsh::config::{Config, StaticConfigSource};
use dogsh::error::DogshError;
use dogsh::image::{DogApiClient, ImageSource};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DogApiClient {
    let mut config = Config::default();
    config.image.base_url = format!("{}/api", server.uri());
    DogApiClient::new(Arc::new(StaticConfigSource(config)))
}

fn image_body(url: &str) -> serde_json::Value {
    json!({ "message": url, "status": "success" })
}

#[tokio::test]
async fn random_image_derives_breed_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breeds/image/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body(
            "https://images.dog.ceo/breeds/hound-afghan/n02088094_1003.jpg",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let image = client_for(&server)
        .fetch(None)
        .await
        .unwrap_or_else(|e| panic!("Expected Ok, got Err: {e}"));

    assert_eq!(
        image.url,
        "https://images.dog.ceo/breeds/hound-afghan/n02088094_1003.jpg"
    );
    assert_eq!(image.breed, "afghan hound");
}

#[tokio::test]
async fn breed_image_uses_main_sub_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breed/retriever/golden/images/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body(
            "https://images.dog.ceo/breeds/retriever-golden/n02099601_100.jpg",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let breed = BreedPath::parse("retriever/golden").unwrap();
    let image = client_for(&server).fetch(Some(&breed)).await.unwrap();

    assert_eq!(image.breed, "golden retriever");
}

#[tokio::test]
async fn unknown_breed_is_breed_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breed/wolfdog/images/random"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error",
            "message": "Breed not found (main breed does not exist)",
            "code": 404
        })))
        .mount(&server)
        .await;

    let breed = BreedPath::parse("wolfdog").unwrap();
    let err = client_for(&server).fetch(Some(&breed)).await.unwrap_err();

    match err {
        DogshError::BreedNotFound { path } => assert_eq!(path, "wolfdog"),
        other => panic!("Expected BreedNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_on_random_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breeds/image/random"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch(None).await.unwrap_err();
    assert!(matches!(err, DogshError::Fetch { .. }), "got: {err:?}");
}

#[tokio::test]
async fn non_success_status_field_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breeds/image/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "maintenance",
            "status": "error"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch(None).await.unwrap_err();
    assert!(matches!(err, DogshError::Fetch { .. }), "got: {err:?}");
}

#[tokio::test]
async fn undecodable_body_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breeds/image/random"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>woof</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch(None).await.unwrap_err();
    assert!(matches!(err, DogshError::Fetch { .. }), "got: {err:?}");
}

#[tokio::test]
async fn url_without_breed_marker_falls_back_to_dog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/breeds/image/random"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(image_body("https://cdn.example.com/pictures/1.jpg")),
        )
        .mount(&server)
        .await;

    let image = client_for(&server).fetch(None).await.unwrap();
    assert_eq!(image.breed, "dog");
}

#[tokio::test]
async fn unreachable_server_is_fetch_error() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    drop(server);

    let err = client.fetch(None).await.unwrap_err();
    assert!(matches!(err, DogshError::Fetch { .. }), "got: {err:?}");
}
