//! SigV4 signing through the real transport.

use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use neptune_api_client::{CreateLoaderInput, Format, GetLoaderInput};
use serde_json::json;

fn rfc3339_utc() -> Matcher {
    Matcher::Regex(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$".to_string())
}

#[tokio::test]
async fn test_signed_request_carries_auth_headers_and_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/loader")
        .match_header(
            "authorization",
            Matcher::Regex(
                r"^AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/\d{8}/us-east-1/neptune-db/aws4_request, SignedHeaders=content-type;host;x-amz-date, Signature=[0-9a-f]{64}$"
                    .to_string(),
            ),
        )
        .match_header("x-amz-date", Matcher::Regex(r"^\d{8}T\d{6}Z$".to_string()))
        .match_header("date", rfc3339_utc())
        .match_body(Matcher::Json(json!({
            "source": "s3://bucket/graph/",
            "format": "nquads"
        })))
        .with_status(200)
        .with_body(r#"{"status":"200 OK","payload":{"loadId":"load-9"}}"#)
        .create_async()
        .await;

    let output = fixture
        .signed_client()
        .create_loader
        .call(&CreateLoaderInput::new("s3://bucket/graph/", Format::Nquads))
        .await
        .unwrap();

    assert_eq!(output.load_id(), Some("load-9"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_signed_request_without_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", MockServerFixture::loader_path())
        .match_query(Matcher::UrlEncoded("loadId".to_string(), "load-9".to_string()))
        .match_header(
            "authorization",
            Matcher::Regex(r"^AWS4-HMAC-SHA256 .*SignedHeaders=host;x-amz-date,".to_string()),
        )
        .match_header("date", rfc3339_utc())
        .with_status(200)
        .with_body(r#"{"status":"200 OK","payload":{"overallStatus":{"status":"LOAD_COMPLETED"}}}"#)
        .create_async()
        .await;

    let output = fixture
        .signed_client()
        .get_loader
        .call(&GetLoaderInput::for_load("load-9"))
        .await
        .unwrap();

    assert_eq!(output.overall_status(), Some("LOAD_COMPLETED"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unsigned_client_sends_no_auth_headers() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", MockServerFixture::loader_path())
        .match_query(Matcher::Any)
        .match_header("authorization", Matcher::Missing)
        .match_header("x-amz-date", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"status":"200 OK"}"#)
        .create_async()
        .await;

    fixture
        .client()
        .get_loader
        .call(&GetLoaderInput::for_load("load-9"))
        .await
        .unwrap();

    mock.assert_async().await;
}
