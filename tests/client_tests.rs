//! Integration tests against a WireMock SendGrid stand-in.
//!
//! These run the real reqwest transport end to end and verify paths,
//! methods, headers, bodies and the exact number of calls made.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use sendgrid_client::errors::DUPLICATE_NICKNAME_ERROR_MESSAGE;
use sendgrid_client::{
    Attachment, Email, InvariantViolation, SendGridClient, SendGridError, SenderDetails,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";
const NICKNAME: &str = "testNickname";
const SENDER_ID: &str = "1325731";

fn client(server: &MockServer) -> SendGridClient {
    SendGridClient::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .max_connections(1)
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build client")
}

fn authorized(http_method: &str, endpoint: &str) -> wiremock::MockBuilder {
    Mock::given(method(http_method))
        .and(path(endpoint))
        .and(header("Authorization", "Bearer test-api-key"))
}

fn details() -> SenderDetails {
    SenderDetails::new(
        "John Doe",
        "john.doe@mycompany.com",
        "",
        "Edmonton",
        "Canada",
    )
}

fn sender_body(id: u64, nickname: &str, verified: bool) -> Value {
    json!({
        "id": id,
        "nickname": nickname,
        "from": {"email": "john.doe@mycompany.com", "name": "John Doe"},
        "reply_to": {"email": "john.doe@mycompany.com", "name": "John Doe"},
        "address": "",
        "city": "Edmonton",
        "country": "Canada",
        "verified": {"status": verified, "reason": null},
        "locked": false
    })
}

fn errors_body(messages: &[&str]) -> Value {
    json!({
        "errors": messages
            .iter()
            .map(|message| json!({"field": null, "message": message}))
            .collect::<Vec<_>>()
    })
}

fn sender_not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(errors_body(&["resource not found"]))
}

#[tokio::test]
async fn test_send_email_posts_template_request() {
    let server = MockServer::start().await;

    authorized("POST", "/mail/send")
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "template_id": "test-template-id",
            "from": {"email": "noreply@johndoe.com", "name": "John Doe"},
            "reply_to": {"email": "noreply@johndoe.com", "name": "John Doe"},
            "personalizations": [{
                "to": [{"email": "john.doe@mycompany.com"}],
                "dynamic_template_data": {
                    "subject": "Hello, World!",
                    "key": "value",
                    "senderSignatureName": "John Doe"
                }
            }],
            "attachments": [{
                "content": "anyBase64Content",
                "filename": "some.pdf",
                "type": "application/pdf"
            }]
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let email = Email::new(
        "test-template-id",
        "noreply@johndoe.com",
        "john.doe@mycompany.com",
    )
    .with_parameter("subject", "Hello, World!")
    .with_parameter("key", "value")
    .with_parameter("senderSignatureName", "John Doe")
    .with_attachment(Attachment::new(
        "anyBase64Content",
        "some.pdf",
        "application/pdf",
    ));

    client(&server).mail().send(&email).await.unwrap();
}

#[tokio::test]
async fn test_send_email_propagates_unexpected_error() {
    let server = MockServer::start().await;

    authorized("POST", "/mail/send")
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let email = Email::new("tpl", "a@example.com", "b@example.com");
    let error = client(&server).mail().send(&email).await.unwrap_err();

    assert!(matches!(error, SendGridError::Unclassified { status: 500, .. }));
}

#[tokio::test]
async fn test_create_sender_returns_id() {
    let server = MockServer::start().await;

    authorized("POST", "/marketing/senders")
        .and(header("Accept", "application/json"))
        .and(body_json(json!({
            "nickname": NICKNAME,
            "from": {"name": "John Doe", "email": "john.doe@mycompany.com"},
            "reply_to": {"name": "John Doe", "email": "john.doe@mycompany.com"},
            "address": "",
            "city": "Edmonton",
            "country": "Canada"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(sender_body(1325731, NICKNAME, false)))
        .expect(1)
        .mount(&server)
        .await;

    let id = client(&server)
        .senders()
        .create(NICKNAME, &details())
        .await
        .unwrap();

    assert_eq!(id, SENDER_ID);
}

#[tokio::test]
async fn test_create_sender_recovers_from_duplicate_nickname_with_three_calls() {
    let server = MockServer::start().await;

    authorized("POST", "/marketing/senders")
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(errors_body(&[DUPLICATE_NICKNAME_ERROR_MESSAGE])),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    authorized("POST", "/marketing/senders")
        .respond_with(ResponseTemplate::new(201).set_body_json(sender_body(1325731, NICKNAME, false)))
        .expect(1)
        .mount(&server)
        .await;

    authorized("GET", "/marketing/senders")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            sender_body(1, "someoneElse", true),
            sender_body(777, NICKNAME, false),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    authorized("DELETE", "/marketing/senders/777")
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let id = client(&server)
        .senders()
        .create(NICKNAME, &details())
        .await
        .unwrap();

    assert_eq!(id, SENDER_ID);

    let received = server.received_requests().await.unwrap();
    let sequence: Vec<(String, String)> = received
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_string()))
        .collect();
    assert_eq!(
        sequence,
        vec![
            ("POST".to_string(), "/marketing/senders".to_string()),
            ("GET".to_string(), "/marketing/senders".to_string()),
            ("DELETE".to_string(), "/marketing/senders/777".to_string()),
            ("POST".to_string(), "/marketing/senders".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_create_sender_does_not_retry_twice() {
    let server = MockServer::start().await;

    authorized("POST", "/marketing/senders")
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(errors_body(&[DUPLICATE_NICKNAME_ERROR_MESSAGE])),
        )
        .expect(2)
        .mount(&server)
        .await;

    authorized("GET", "/marketing/senders")
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([sender_body(777, NICKNAME, false)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    authorized("DELETE", "/marketing/senders/777")
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server)
        .senders()
        .create(NICKNAME, &details())
        .await
        .unwrap_err();

    assert!(matches!(error, SendGridError::SenderAlreadyExists { .. }));
}

#[tokio::test]
async fn test_create_sender_with_missing_duplicate_is_invariant_violation() {
    let server = MockServer::start().await;

    authorized("POST", "/marketing/senders")
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(errors_body(&[DUPLICATE_NICKNAME_ERROR_MESSAGE])),
        )
        .expect(1)
        .mount(&server)
        .await;

    authorized("GET", "/marketing/senders")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server)
        .senders()
        .create(NICKNAME, &details())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        SendGridError::InvariantViolation(InvariantViolation::NoSenderWithNickname { .. })
    ));
}

#[tokio::test]
async fn test_create_sender_with_invalid_data_is_invalid_sender() {
    let server = MockServer::start().await;

    authorized("POST", "/marketing/senders")
        .respond_with(
            ResponseTemplate::new(400).set_body_json(errors_body(&["invalid from.email"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server)
        .senders()
        .create(NICKNAME, &details())
        .await
        .unwrap_err();

    match error {
        SendGridError::InvalidSender { payload } => {
            assert_eq!(payload.messages(), vec!["invalid from.email"])
        }
        other => panic!("Expected InvalidSender, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_sender_sends_patch() {
    let server = MockServer::start().await;

    authorized("PATCH", "/marketing/senders/1325731")
        .and(header("Accept", "application/json"))
        .and(body_json(json!({
            "from": {"name": "Jane Doe", "email": "jane.doe@mycompany.com"},
            "reply_to": {"name": "Jane Doe", "email": "jane.doe@mycompany.com"},
            "address": "Oxford street 23",
            "city": "Dublin",
            "country": "Ireland"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sender_body(1325731, NICKNAME, true)))
        .expect(1)
        .mount(&server)
        .await;

    let details = SenderDetails::new(
        "Jane Doe",
        "jane.doe@mycompany.com",
        "Oxford street 23",
        "Dublin",
        "Ireland",
    );

    client(&server)
        .senders()
        .update(SENDER_ID, &details)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_sender_errors() {
    let server = MockServer::start().await;

    authorized("PATCH", "/marketing/senders/400")
        .respond_with(ResponseTemplate::new(400).set_body_json(errors_body(&["invalid email"])))
        .mount(&server)
        .await;
    authorized("PATCH", "/marketing/senders/404")
        .respond_with(sender_not_found())
        .mount(&server)
        .await;
    authorized("PATCH", "/marketing/senders/500")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);

    match client.senders().update("400", &details()).await.unwrap_err() {
        SendGridError::InvalidSender { payload } => {
            assert_eq!(payload.messages(), vec!["invalid email"])
        }
        other => panic!("Expected InvalidSender, got {:?}", other),
    }
    assert!(client
        .senders()
        .update("404", &details())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(matches!(
        client.senders().update("500", &details()).await.unwrap_err(),
        SendGridError::Unclassified { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_delete_sender() {
    let server = MockServer::start().await;

    authorized("DELETE", "/marketing/senders/1325731")
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    authorized("DELETE", "/marketing/senders/404")
        .respond_with(sender_not_found())
        .expect(1)
        .mount(&server)
        .await;
    authorized("DELETE", "/marketing/senders/500")
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);

    client.senders().delete(SENDER_ID).await.unwrap();
    client.senders().delete("404").await.unwrap();
    assert!(matches!(
        client.senders().delete("500").await.unwrap_err(),
        SendGridError::Unclassified { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_fetch_verification_status() {
    let server = MockServer::start().await;

    authorized("GET", "/marketing/senders/1")
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sender_body(1, "one", true)))
        .mount(&server)
        .await;
    authorized("GET", "/marketing/senders/2")
        .respond_with(ResponseTemplate::new(200).set_body_json(sender_body(2, "two", false)))
        .mount(&server)
        .await;
    authorized("GET", "/marketing/senders/404")
        .respond_with(sender_not_found())
        .mount(&server)
        .await;
    authorized("GET", "/marketing/senders/500")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);

    assert!(client.senders().fetch_verification_status("1").await.unwrap());
    assert!(!client.senders().fetch_verification_status("2").await.unwrap());
    assert!(client
        .senders()
        .fetch_verification_status("404")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(matches!(
        client.senders().fetch_verification_status("500").await.unwrap_err(),
        SendGridError::Unclassified { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_resend_verification_email() {
    let server = MockServer::start().await;

    authorized("POST", "/marketing/senders/1325731/resend_verification")
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    authorized("POST", "/marketing/senders/400/resend_verification")
        .respond_with(ResponseTemplate::new(400).set_body_json(errors_body(&["already verified"])))
        .mount(&server)
        .await;
    authorized("POST", "/marketing/senders/404/resend_verification")
        .respond_with(sender_not_found())
        .mount(&server)
        .await;
    authorized("POST", "/marketing/senders/500/resend_verification")
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server);

    client
        .senders()
        .resend_verification_email(SENDER_ID)
        .await
        .unwrap();
    assert!(matches!(
        client
            .senders()
            .resend_verification_email("400")
            .await
            .unwrap_err(),
        SendGridError::SenderAlreadyVerified { .. }
    ));
    assert!(client
        .senders()
        .resend_verification_email("404")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(matches!(
        client
            .senders()
            .resend_verification_email("500")
            .await
            .unwrap_err(),
        SendGridError::Unclassified { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_concurrent_calls_complete_independently() {
    let server = MockServer::start().await;

    authorized("POST", "/mail/send")
        .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_millis(50)))
        .expect(4)
        .mount(&server)
        .await;

    let client = client(&server);
    let email = Email::new("tpl", "a@example.com", "b@example.com");

    let started = Instant::now();
    let (a, b, c, d) = tokio::join!(
        client.mail().send(&email),
        client.mail().send(&email),
        client.mail().send(&email),
        client.mail().send(&email),
    );
    let elapsed = started.elapsed();

    assert!(a.is_ok() && b.is_ok() && c.is_ok() && d.is_ok());
    // One connection permit: the four 50ms responses are served back to back.
    assert!(
        elapsed >= Duration::from_millis(200),
        "calls overlapped, finished in {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_calls_overlap_up_to_connection_limit() {
    let server = MockServer::start().await;

    authorized("POST", "/mail/send")
        .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_millis(300)))
        .expect(4)
        .mount(&server)
        .await;

    let client = SendGridClient::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .max_connections(4)
        .build()
        .unwrap();
    let email = Email::new("tpl", "a@example.com", "b@example.com");

    let started = Instant::now();
    let (a, b, c, d) = tokio::join!(
        client.mail().send(&email),
        client.mail().send(&email),
        client.mail().send(&email),
        client.mail().send(&email),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok() && d.is_ok());
    assert!(started.elapsed() < Duration::from_millis(1200));
}

#[tokio::test]
async fn test_dropped_call_releases_its_connection() {
    let server = MockServer::start().await;

    authorized("DELETE", "/marketing/senders/slow")
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    authorized("DELETE", "/marketing/senders/1")
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);

    let abandoned =
        tokio::time::timeout(Duration::from_millis(100), client.senders().delete("slow")).await;
    assert!(abandoned.is_err());

    let next = tokio::time::timeout(Duration::from_secs(2), client.senders().delete("1"))
        .await
        .expect("connection permit was not released");
    assert!(next.is_ok());
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    authorized("DELETE", "/marketing/senders/1")
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = SendGridClient::builder()
        .api_key(API_KEY)
        .base_url(server.uri())
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let error = client.senders().delete("1").await.unwrap_err();

    assert!(matches!(error, SendGridError::Timeout { .. }));
}
