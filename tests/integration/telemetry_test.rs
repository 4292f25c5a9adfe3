use serde_json::Value;
use wiremock::{
    matchers::{header, method, path},
    Mock, ResponseTemplate,
};

use super::common::{
    body_text, header as request_header, wait_for_requests, TestOrigins, BROWSER_UA, CHATGPT_UA,
    COLLECTOR_PATH, GPTBOT_UA, ORG_PREFIX,
};

async fn mount_alternate_hit(origins: &TestOrigins, page: &str, body: &str) {
    Mock::given(path(format!("{}{}", ORG_PREFIX, page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&origins.alternate)
        .await;
}

#[test_log::test(tokio::test)]
async fn ai_visit_posts_one_event() {
    let origins = TestOrigins::start().await;
    mount_alternate_hit(&origins, "/pricing", "alt pricing").await;

    Mock::given(method("POST"))
        .and(path(COLLECTOR_PATH))
        .and(header("content-type", "application/json"))
        .and(header("user-agent", "PostmanRuntime/7.32.2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&origins.collector)
        .await;

    let request = origins.incoming("/pricing?plan=pro", Some(CHATGPT_UA));
    let visit_url = request.url.to_string();
    let response = origins.router().handle(request).await.unwrap();
    assert_eq!(body_text(response).await, "alt pricing");

    let events = wait_for_requests(&origins.collector, 1).await;
    assert_eq!(events.len(), 1);

    let event: Value = serde_json::from_slice(&events[0].body).unwrap();
    assert_eq!(event["event_type"], "chatgpt_user_agent");
    assert_eq!(event["url"], visit_url.as_str());
    assert_eq!(event["data"]["launcher"], "proxy");
    assert_eq!(event["data"]["url"], visit_url.as_str());
    assert_eq!(event["data"]["bot_type"], "ChatGPT-User");
    assert_eq!(event["campaign_id"], "00000000-0000-0000-0000-000000000000");
    assert_eq!(event["organization_id"], "87996776-2ccf-4198-bd8a-3aa7c5a6986c");

    let visitor_id = event["user_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(visitor_id).is_ok());
}

#[test_log::test(tokio::test)]
async fn event_reports_highest_priority_bot() {
    let origins = TestOrigins::start().await;
    mount_alternate_hit(&origins, "/", "alt").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&origins.collector)
        .await;

    origins
        .router()
        .handle(origins.incoming("/", Some("PerplexityBot GPTBot/1.0")))
        .await
        .unwrap();

    let events = wait_for_requests(&origins.collector, 1).await;
    let event: Value = serde_json::from_slice(&events[0].body).unwrap();
    assert_eq!(event["data"]["bot_type"], "GPTBot");
}

#[test_log::test(tokio::test)]
async fn browsers_send_no_events() {
    let origins = TestOrigins::start().await;

    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&origins.webserver)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&origins.collector)
        .await;

    origins
        .router()
        .handle(origins.incoming("/", Some(BROWSER_UA)))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(origins.collector.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn collector_error_does_not_change_response() {
    let origins = TestOrigins::start().await;
    mount_alternate_hit(&origins, "/guide", "alt guide").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&origins.collector)
        .await;

    let response = origins
        .router()
        .handle(origins.incoming("/guide", Some(GPTBOT_UA)))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(body_text(response).await, "alt guide");

    // One attempt only, even though it failed.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(origins.collector.received_requests().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn unreachable_collector_does_not_change_response() {
    let origins = TestOrigins::start().await;
    mount_alternate_hit(&origins, "/guide", "alt guide").await;

    let config = origins
        .router_config()
        .with_telemetry_endpoint("http://127.0.0.1:1/prod/event_stream");
    let router = agent_origin_router::build_router(std::sync::Arc::new(config));

    let response = router
        .handle(origins.incoming("/guide", Some(GPTBOT_UA)))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(body_text(response).await, "alt guide");
}

#[test_log::test(tokio::test)]
async fn slow_collector_does_not_delay_response() {
    let origins = TestOrigins::start().await;
    mount_alternate_hit(&origins, "/", "fast").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
        .mount(&origins.collector)
        .await;

    let started = std::time::Instant::now();
    let response = origins
        .router()
        .handle(origins.incoming("/", Some(GPTBOT_UA)))
        .await
        .unwrap();

    assert_eq!(body_text(response).await, "fast");
    assert!(started.elapsed() < std::time::Duration::from_secs(4));

    let events = wait_for_requests(&origins.collector, 1).await;
    assert_eq!(request_header(&events[0], "content-type"), Some("application/json"));
}
