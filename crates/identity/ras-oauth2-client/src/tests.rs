//! Integration tests against a mock provider.

#[cfg(test)]
mod integration_tests {
    use crate::{HttpOAuth2Client, OAuth2Client, OAuth2ClientConfig, OAuth2Error};
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server() -> (MockServer, OAuth2ClientConfig) {
        let mock_server = MockServer::start().await;

        let config = OAuth2ClientConfig::new(
            "mock_client_id",
            "mock_secret",
            format!("{}/authorize", mock_server.uri()),
            format!("{}/token", mock_server.uri()),
        )
        .with_callback_url("http://localhost:3000/callback")
        .with_scope(["profile"]);

        (mock_server, config)
    }

    #[tokio::test]
    async fn test_get_with_bearer_header() {
        let (mock_server, config) = setup_mock_server().await;

        // Mock API endpoint that only accepts the bearer header
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("Authorization", "Bearer mock_access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"1"}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            HttpOAuth2Client::with_defaults(config.with_authorization_header_for_get(true))
                .unwrap();

        let body = client
            .get(&format!("{}/me", mock_server.uri()), "mock_access_token")
            .await
            .unwrap();
        assert_eq!(body, r#"{"id":"1"}"#);
    }

    #[tokio::test]
    async fn test_get_with_query_parameter() {
        let (mock_server, config) = setup_mock_server().await;

        // Mock API endpoint that only accepts the query parameter
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(query_param("access_token", "mock_access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpOAuth2Client::with_defaults(config).unwrap();

        let body = client
            .get(&format!("{}/me", mock_server.uri()), "mock_access_token")
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_get_reports_status_and_body() {
        let (mock_server, config) = setup_mock_server().await;

        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_token"))
            .mount(&mock_server)
            .await;

        let client =
            HttpOAuth2Client::with_defaults(config.with_authorization_header_for_get(true))
                .unwrap();

        let result = client
            .get(&format!("{}/me", mock_server.uri()), "expired")
            .await;
        match result {
            Err(OAuth2Error::UnexpectedStatus { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_token");
            }
            other => panic!("Expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_full_code_exchange_with_state() {
        let (mock_server, config) = setup_mock_server().await;

        // Mock token endpoint
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=mock_auth_code"))
            .and(body_string_contains("client_secret=mock_secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "mock_access_token",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "mock_refresh_token"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HttpOAuth2Client::with_defaults(config.with_state(true)).unwrap();

        // Start the flow
        let request = client.authorization_url(&HashMap::new()).await.unwrap();
        let state = request.state.unwrap();

        // Simulate the callback
        let tokens = client
            .exchange_code("mock_auth_code", Some(&state))
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "mock_access_token");
        assert_eq!(tokens.refresh_token.as_deref(), Some("mock_refresh_token"));
        assert_eq!(tokens.expires_in, Some(3600));

        // The state was consumed by the first exchange.
        let replay = client.exchange_code("mock_auth_code", Some(&state)).await;
        assert!(matches!(replay, Err(OAuth2Error::StateNotFound)));
    }

    #[tokio::test]
    async fn test_form_encoded_token_response() {
        let (mock_server, config) = setup_mock_server().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("access_token=form_token&token_type=bearer"),
            )
            .mount(&mock_server)
            .await;

        let client = HttpOAuth2Client::with_defaults(config).unwrap();

        let tokens = client.exchange_code("code", None).await.unwrap();
        assert_eq!(tokens.access_token, "form_token");
        assert_eq!(tokens.token_type.as_deref(), Some("bearer"));
    }

    #[tokio::test]
    async fn test_token_exchange_error_cases() {
        let (mock_server, config) = setup_mock_server().await;

        // Test invalid authorization code
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=invalid_code"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "The provided authorization code is invalid"
            })))
            .mount(&mock_server)
            .await;

        // Test unparseable token body
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("code=garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = HttpOAuth2Client::with_defaults(config).unwrap();

        let result = client.exchange_code("invalid_code", None).await;
        assert!(matches!(
            result,
            Err(OAuth2Error::TokenExchangeFailed(body)) if body.contains("invalid_grant")
        ));

        let result = client.exchange_code("garbled", None).await;
        assert!(matches!(result, Err(OAuth2Error::InvalidTokenResponse(_))));
    }

    #[tokio::test]
    async fn test_get_transport_error() {
        let (_mock_server, config) = setup_mock_server().await;

        // Reserve a port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client =
            HttpOAuth2Client::with_defaults(config.with_authorization_header_for_get(true))
                .unwrap();

        let result = client
            .get(&format!("http://127.0.0.1:{}/me", port), "mock_access_token")
            .await;
        match result {
            Err(OAuth2Error::HttpError(e)) => assert!(e.is_connect()),
            other => panic!("Expected HttpError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_abandoned_states_do_not_accumulate() {
        let (_mock_server, config) = setup_mock_server().await;

        let client =
            HttpOAuth2Client::with_defaults(config.with_state(true).with_state_ttl(0)).unwrap();

        // Start many flows that never come back
        for _ in 0..50 {
            let request = client.authorization_url(&HashMap::new()).await.unwrap();
            assert!(request.state.is_some());
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        // Only the most recent state can still be around
        let leftover = client.state_store().cleanup_expired().await.unwrap();
        assert!(leftover <= 1, "{} expired states were left behind", leftover);
    }
}
