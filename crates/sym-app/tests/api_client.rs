use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use pretty_assertions::assert_eq;
use serde_json::json;
use sym_app::{
    ChatClient, EventSink, Gateway, HealthProbe, HealthStatus, HttpGateway, JobEvent, JobLifecycleClient,
    PollOptions,
};
use sym_core::{ClientError, FailureKind, HttpError, JobHandle, JobOutcome, JobRequest};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> Arc<dyn Gateway> {
    Arc::new(HttpGateway::new(server.uri(), Duration::from_secs(5)).expect("gateway build"))
}

fn fast_poll() -> PollOptions {
    PollOptions::from_millis(10, 5_000)
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind temp port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

#[tokio::test]
async fn test_submit_posts_json_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/image/jobs"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "prompt": "a koi pond at dawn",
            "steps": 28,
            "guidance": 7.5,
            "width": 512,
            "height": 512,
            "seed": null,
            "model_id": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "job_id": "job-1",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = JobLifecycleClient::new(gateway_for(&server), EventSink::disconnected());
    let handle = client.submit(&JobRequest::new("a koi pond at dawn")).await.expect("submit");
    assert_eq!(handle, JobHandle::new("job-1"));

    server.verify().await;
}

#[tokio::test]
async fn test_submit_blank_prompt_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "nope" })))
        .expect(0)
        .mount(&server)
        .await;

    let client = JobLifecycleClient::new(gateway_for(&server), EventSink::disconnected());
    let err = client.submit(&JobRequest::new(" \n ")).await.unwrap_err();
    assert!(err.is_validation());

    server.verify().await;
}

#[tokio::test]
async fn test_error_body_becomes_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/image/jobs"))
        .respond_with(ResponseTemplate::new(402).set_body_string("not enough credits"))
        .mount(&server)
        .await;

    let client = JobLifecycleClient::new(gateway_for(&server), EventSink::disconnected());
    let err = client.submit(&JobRequest::new("fox")).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Http(HttpError::Status { status: 402, message: "not enough credits".into() })
    );
}

#[tokio::test]
async fn test_empty_error_body_falls_back_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .request(reqwest::Method::GET, "/health", None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503");
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let base = format!("http://127.0.0.1:{}", free_port());
    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(base, Duration::from_secs(2)).expect("gateway build"));

    let err = gateway.request(reqwest::Method::GET, "/health", None).await.unwrap_err();
    assert!(err.is_transport());

    let status = HealthStatus::from_result(HealthProbe::new(gateway).check().await);
    assert_eq!(status, HealthStatus { ok: false, label: "down".into() });
}

#[tokio::test]
async fn test_health_reports_remote_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let status = HealthProbe::new(gateway_for(&server)).check().await.expect("health");
    assert_eq!(status, HealthStatus { ok: true, label: "ok".into() });
}

#[tokio::test]
async fn test_poll_follows_job_to_completion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/image/jobs/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "job": { "id": "job-7", "status": "running", "output_url": null, "error": null }
        })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/image/jobs/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "job": { "id": "job-7", "status": "done", "output_url": "/outputs/images/job-7.png", "error": null }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (sink, mut rx) = EventSink::channel();
    let client = JobLifecycleClient::new(gateway_for(&server), sink);

    let outcome = client.poll(&JobHandle::new("job-7"), &fast_poll()).await.expect("poll ran");
    assert_eq!(outcome, JobOutcome::Success { artifact_url: "/outputs/images/job-7.png".into() });

    let mut progress = 0;
    let mut terminal = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            JobEvent::JobProgress(_) => progress += 1,
            other => terminal.push(other),
        }
    }
    assert_eq!(progress, 2);
    assert_eq!(
        terminal,
        vec![JobEvent::JobComplete { job_id: "job-7".into(), artifact_url: "/outputs/images/job-7.png".into() }]
    );

    server.verify().await;
}

#[tokio::test]
async fn test_poll_http_error_is_failure_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/image/jobs/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\":\"job not found\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = JobLifecycleClient::new(gateway_for(&server), EventSink::disconnected());
    let outcome = client.poll(&JobHandle::new("gone"), &fast_poll()).await.expect("poll ran");
    assert_eq!(
        outcome,
        JobOutcome::Failure { message: "{\"detail\":\"job not found\"}".into(), kind: FailureKind::Status }
    );
    assert!(!client.is_polling());

    server.verify().await;
}

#[tokio::test]
async fn test_list_jobs_sends_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/image/jobs"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "jobs": [{ "id": "j1", "status": "queued", "prompt": "owl", "created_at": "2025-03-01 09:00:00" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = JobLifecycleClient::new(gateway_for(&server), EventSink::disconnected());
    let jobs = client.list_jobs(5).await.expect("list");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].prompt.as_deref(), Some("owl"));

    server.verify().await;
}

#[tokio::test]
async fn test_chat_reads_text_and_suggestions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(query_param("prompt", "ideas for a moody street & rain?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "Here you go:\n1) neon alley in the rain\n- wet cobblestones, low angle\nEnjoy!"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = ChatClient::new(gateway_for(&server))
        .send("  ideas for a moody street & rain?  ")
        .await
        .expect("chat");

    assert!(reply.text.starts_with("Here you go:"));
    assert_eq!(reply.suggestions, vec!["neon alley in the rain", "wet cobblestones, low angle"]);

    server.verify().await;
}

#[tokio::test]
async fn test_chat_unknown_shape_is_dumped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "hi there" })))
        .mount(&server)
        .await;

    let reply = ChatClient::new(gateway_for(&server)).send("hello").await.expect("chat");
    assert_eq!(reply.text, r#"{"response":"hi there"}"#);
    assert!(reply.suggestions.is_empty());
}

#[tokio::test]
async fn test_chat_blank_message_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let err = ChatClient::new(gateway_for(&server)).send("   ").await.unwrap_err();
    assert!(err.is_validation());

    server.verify().await;
}

#[tokio::test]
async fn test_session_cookie_from_health_is_sent_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sym_anon=abc; Path=/; HttpOnly")
                .set_body_json(json!({ "status": "ok" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/image/jobs"))
        .and(header("cookie", "sym_anon=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "job_id": "job-9" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/image/jobs"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("{\"detail\":\"missing anon id cookie (sym_anon)\"}"),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let client = JobLifecycleClient::new(gateway.clone(), EventSink::disconnected());

    let err = client.submit(&JobRequest::new("fox")).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Http(HttpError::Status {
            status: 400,
            message: "{\"detail\":\"missing anon id cookie (sym_anon)\"}".into()
        })
    );

    HealthProbe::new(gateway).check().await.expect("health");
    let handle = client.submit(&JobRequest::new("fox")).await.expect("submit with session");
    assert_eq!(handle, JobHandle::new("job-9"));

    server.verify().await;
}

#[tokio::test]
async fn test_chat_empty_body_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = ChatClient::new(gateway_for(&server)).send("hello").await.unwrap_err();
    assert!(matches!(err, ClientError::Http(HttpError::Decode(_))));
}
