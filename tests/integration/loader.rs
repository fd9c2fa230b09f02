//! Loader operations end to end through the default `reqwest` transport.

use crate::init_tracing;
use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use neptune_api_client::{CancelLoaderInput, CreateLoaderInput, Format, GetLoaderInput, Mode};
use serde_json::json;

#[tokio::test]
async fn test_create_load_job() {
    init_tracing();
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/loader")
        .match_header("content-type", "application/json")
        .match_header(
            "user-agent",
            Matcher::Regex(r"^neptune-api-client \(\S+ \S+; Rust .+\)$".to_string()),
        )
        .match_body(Matcher::Json(json!({
            "source": "s3://bucket/graph/",
            "format": "csv",
            "mode": "NEW",
            "iamRoleArn": "arn:aws:iam::123456789012:role/NeptuneLoadFromS3"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"200 OK","payload":{"loadId":"load-1"}}"#)
        .create_async()
        .await;

    let client = fixture.client();
    let input = CreateLoaderInput::new("s3://bucket/graph/", Format::Csv)
        .mode(Mode::New)
        .iam_role_arn("arn:aws:iam::123456789012:role/NeptuneLoadFromS3");
    let output = client.create_loader.call(&input).await.unwrap();

    assert_eq!(output.load_id(), Some("load-1"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_status_sends_supplied_parameters() {
    init_tracing();
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            "GET",
            Matcher::AllOf(vec![
                Matcher::UrlEncoded("loadId".to_string(), "load-1".to_string()),
                Matcher::UrlEncoded("details".to_string(), "TRUE".to_string()),
                Matcher::UrlEncoded("errorsPerPage".to_string(), "5".to_string()),
            ]),
            200,
            r#"{"status":"200 OK","payload":{"overallStatus":{"status":"LOAD_IN_PROGRESS","totalRecords":120}}}"#,
        )
        .await;

    let client = fixture.client();
    let input = GetLoaderInput {
        load_id: Some("load-1".to_string()),
        details: Some(true),
        errors_per_page: Some(5),
        ..Default::default()
    };
    let output = client.get_loader.call(&input).await.unwrap();

    assert_eq!(output.overall_status(), Some("LOAD_IN_PROGRESS"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_queued_loads() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            "GET",
            Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".to_string(), "3".to_string()),
                Matcher::UrlEncoded("includeQueuedLoads".to_string(), "TRUE".to_string()),
            ]),
            200,
            r#"{"status":"200 OK","payload":{"loadIds":["a","b","c"]}}"#,
        )
        .await;

    let client = fixture.client();
    let input = GetLoaderInput {
        limit: Some(3),
        include_queued_loads: Some(true),
        ..Default::default()
    };
    let output = client.get_loader.call(&input).await.unwrap();

    assert_eq!(output.payload.unwrap().load_ids, vec!["a", "b", "c"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_load_job() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("DELETE", MockServerFixture::loader_path())
        .match_query(Matcher::UrlEncoded("loadId".to_string(), "load-1".to_string()))
        .with_status(200)
        .create_async()
        .await;

    let client = fixture.client();
    client
        .cancel_loader
        .call(&CancelLoaderInput::new("load-1"))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_without_load_id_sends_nothing() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("DELETE", MockServerFixture::loader_path())
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = fixture.client();
    let err = client
        .cancel_loader
        .call(&CancelLoaderInput::default())
        .await
        .unwrap_err();

    assert!(matches!(err, neptune_api_client::Error::Validation { .. }));
    mock.assert_async().await;
}
