mod common;

use common::TestApp;
use gateway_service::services::providers::mock::MockProvider;
use gateway_service::services::providers::ProviderError;
use reqwest::multipart;
use reqwest::StatusCode;
use serde_json::json;

fn document_form(data: &[u8], mime: &str) -> multipart::Form {
    multipart::Form::new().part(
        "document",
        multipart::Part::bytes(data.to_vec())
            .file_name("report.txt")
            .mime_str(mime)
            .unwrap(),
    )
}

#[tokio::test]
async fn document_is_sent_with_fixed_prompt_and_reported_mime() {
    let app = TestApp::spawn_with(MockProvider::replying("Summary.")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/generate-from-document", app.address))
        .multipart(document_form(b"quarterly figures", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "output": "Summary." }));

    let calls = app.provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "Analyze this document");

    let attachment = calls[0].attachment.as_ref().expect("No attachment sent");
    assert_eq!(attachment.mime_type, "text/plain");

    assert!(app.staged_files().is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn document_failure_returns_raw_error_value() {
    let app = TestApp::spawn_with(MockProvider::failing(ProviderError::Api {
        status: 500,
        body: json!({ "code": "X" }),
    }))
    .await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/generate-from-document", app.address))
        .multipart(document_form(b"quarterly figures", "text/plain"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "error": { "code": "X" } }));

    assert!(app.staged_files().is_empty());

    app.cleanup().await;
}

/// The same API failure yields a structured error body on the document
/// route but a message string on the audio route.
#[tokio::test]
async fn document_and_audio_error_envelopes_differ() {
    let api_error = ProviderError::Api {
        status: 500,
        body: json!({ "code": "X" }),
    };
    let client = reqwest::Client::new();

    let document_app = TestApp::spawn_with(MockProvider::failing(api_error.clone())).await;
    let document_body: serde_json::Value = client
        .post(format!("{}/generate-from-document", document_app.address))
        .multipart(document_form(b"contents", "text/plain"))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

    let audio_app = TestApp::spawn_with(MockProvider::failing(api_error)).await;
    let audio_form = multipart::Form::new().part(
        "audio",
        multipart::Part::bytes(b"riff".to_vec())
            .file_name("clip.wav")
            .mime_str("audio/wav")
            .unwrap(),
    );
    let audio_body: serde_json::Value = client
        .post(format!("{}/generate-from-audio", audio_app.address))
        .multipart(audio_form)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(document_body["error"], json!({ "code": "X" }));
    assert_eq!(
        audio_body["error"],
        json!("model API error 500: {\"code\":\"X\"}")
    );

    document_app.cleanup().await;
    audio_app.cleanup().await;
}

#[tokio::test]
async fn missing_document_field_is_rejected() {
    let app = TestApp::spawn().await;
    let client = reqwest::Client::new();

    let form = multipart::Form::new().text("note", "no file here");
    let response = client
        .post(format!("{}/generate-from-document", app.address))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.provider.calls().is_empty());

    app.cleanup().await;
}
