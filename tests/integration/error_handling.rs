//! Integration tests for error handling: API errors, decoding errors, transport errors.

use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use neptune_api_client::{CreateLoaderInput, Error, Format, GetLoaderInput, NeptuneClientBuilder};

#[tokio::test]
async fn test_create_bad_request_is_api_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            "POST",
            Matcher::Any,
            400,
            r#"{"requestId":"r1","code":"BAD","detailedMessage":"bad input"}"#,
        )
        .await;

    let client = fixture.client();
    let err = client
        .create_loader
        .call(&CreateLoaderInput::new("s3://bucket/graph/", Format::Csv))
        .await
        .unwrap_err();

    let api = err.as_api_error().expect("expected an API error");
    assert_eq!(api.status_code(), Some(400));
    assert_eq!(api.to_string(), "requestId: r1, code: BAD, message: bad input.");
    assert!(!api.is_retryable());
}

#[tokio::test]
async fn test_error_classification() {
    let test_cases = vec![
        (400, "BadRequestException", false),
        (403, "AccessDeniedException", false),
        (404, "LoadNotFoundException", false),
        (429, "ThrottlingException", true),
        (500, "InternalFailureException", true),
        (503, "ServiceUnavailableException", true),
    ];

    for (status, code, retryable) in test_cases {
        let mut fixture = MockServerFixture::new().await;
        let _mock = fixture
            .mock_json_response(
                "GET",
                Matcher::Any,
                status,
                &format!(
                    r#"{{"requestId":"req-{status}","code":"{code}","detailedMessage":"Test error"}}"#
                ),
            )
            .await;

        let err = fixture
            .client()
            .get_loader
            .call(&GetLoaderInput::for_load("load-1"))
            .await
            .unwrap_err();

        let api = err.as_api_error().expect("expected an API error");
        assert_eq!(api.status_code(), Some(status as u16));
        assert_eq!(api.code(), Some(code));
        assert_eq!(
            api.is_retryable(),
            retryable,
            "status {} should have retryable={}",
            status,
            retryable
        );
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_decode_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", MockServerFixture::loader_path())
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let err = fixture
        .client()
        .get_loader
        .call(&GetLoaderInput::for_load("load-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("HTTP 502"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Bind then release an ephemeral port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = NeptuneClientBuilder::new()
        .address(format!("http://127.0.0.1:{}", port))
        .build()
        .unwrap();

    let err = client
        .get_loader
        .call(&GetLoaderInput::for_load("load-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}
