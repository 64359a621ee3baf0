// Integration tests for the HTTP transport
//
// A local axum server stands in for the reply endpoint and echoes back what it
// received, so the multipart wire format can be checked end to end.

use anyhow::Result;
use axum::{
    extract::Multipart,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chat_widget::{AudioClip, ExchangeInput, HttpTransport, Transport, TransportError};
use serde_json::{json, Value};
use std::time::Duration;

/// Echo every multipart field as JSON
async fn echo(mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        fields.push(json!({
            "name": name,
            "file_name": file_name,
            "content_type": content_type,
            "len": bytes.len(),
            "text": String::from_utf8_lossy(&bytes),
        }));
    }
    Json(json!({ "fields": fields }))
}

async fn spawn_endpoint(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://{}/webhook/audio-input", addr))
}

fn transport(url: &str) -> HttpTransport {
    HttpTransport::new(url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_text_is_posted_as_prompt_field() -> Result<()> {
    let url = spawn_endpoint(Router::new().route("/webhook/audio-input", post(echo))).await?;

    let body = transport(&url)
        .send(ExchangeInput::Text("hello there".to_string()))
        .await?;

    let echoed: Value = serde_json::from_str(&body)?;
    let fields = echoed["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0]["name"], "prompt");
    assert_eq!(fields[0]["text"], "hello there");
    assert!(fields[0]["file_name"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_audio_is_posted_as_file_part() -> Result<()> {
    let url = spawn_endpoint(Router::new().route("/webhook/audio-input", post(echo))).await?;

    let clip = AudioClip::from_chunks(vec![vec![7u8; 300], vec![9u8; 200]]);
    let body = transport(&url).send(ExchangeInput::Audio(clip)).await?;

    let echoed: Value = serde_json::from_str(&body)?;
    let fields = echoed["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0]["name"], "file");
    assert_eq!(fields[0]["file_name"], "input.m4a");
    assert_eq!(fields[0]["content_type"], "audio/m4a");
    assert_eq!(fields[0]["len"], 500);

    Ok(())
}

#[tokio::test]
async fn test_empty_clip_is_still_posted() -> Result<()> {
    let url = spawn_endpoint(Router::new().route("/webhook/audio-input", post(echo))).await?;

    let body = transport(&url)
        .send(ExchangeInput::Audio(AudioClip::default()))
        .await?;

    let echoed: Value = serde_json::from_str(&body)?;
    assert_eq!(echoed["fields"][0]["name"], "file");
    assert_eq!(echoed["fields"][0]["len"], 0);

    Ok(())
}

#[tokio::test]
async fn test_audio_part_is_configurable() -> Result<()> {
    let url = spawn_endpoint(Router::new().route("/webhook/audio-input", post(echo))).await?;

    let body = transport(&url)
        .with_audio_part("note.webm", "audio/webm")
        .send(ExchangeInput::Audio(AudioClip::from_bytes(vec![1, 2, 3])))
        .await?;

    let echoed: Value = serde_json::from_str(&body)?;
    assert_eq!(echoed["fields"][0]["file_name"], "note.webm");
    assert_eq!(echoed["fields"][0]["content_type"], "audio/webm");

    Ok(())
}

#[tokio::test]
async fn test_body_is_returned_unparsed() -> Result<()> {
    let router = Router::new().route(
        "/webhook/audio-input",
        post(|| async { r#"{"response": "raw"}"# }),
    );
    let url = spawn_endpoint(router).await?;

    let body = transport(&url)
        .send(ExchangeInput::Text("hi".to_string()))
        .await?;

    assert_eq!(body, r#"{"response": "raw"}"#);

    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_an_error() -> Result<()> {
    let router = Router::new().route(
        "/webhook/audio-input",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "workflow crashed") }),
    );
    let url = spawn_endpoint(router).await?;

    let err = transport(&url)
        .send(ExchangeInput::Text("hi".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Status { status: 500 }));

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_an_error() -> Result<()> {
    let url = spawn_endpoint(Router::new()).await?;

    let err = transport(&url)
        .send(ExchangeInput::Text("hi".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Status { status: 404 }));

    Ok(())
}

#[tokio::test]
async fn test_hung_endpoint_times_out() -> Result<()> {
    let router = Router::new().route(
        "/webhook/audio-input",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            "too late"
        }),
    );
    let url = spawn_endpoint(router).await?;

    let transport = HttpTransport::new(&url, Duration::from_millis(200))?;
    let err = transport
        .send(ExchangeInput::Text("hi".to_string()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, TransportError::Timeout { after } if after == Duration::from_millis(200)),
        "unexpected error: {}",
        err
    );

    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_network_error() -> Result<()> {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let err = transport(&format!("http://{}/hook", addr))
        .send(ExchangeInput::Text("hi".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Network(_)), "unexpected error: {}", err);

    Ok(())
}
