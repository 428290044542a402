//! # تست‌های Integration
//!
//! سناریوهای end-to-end روی API عمومی کتابخانه و روی router.
//!
//! ## اجرای تست‌ها:
//! ```bash
//! cargo test                           # همه تست‌ها
//! cargo test --lib                     # فقط تست‌های unit
//! cargo test --test integration_tests  # فقط این فایل
//! ```

use std::sync::Arc;

use chrono::Duration;
use shortlink_registry::{
    config::{Config, ConfigBuilder},
    models::{event_types, AuditLogEntry, CreateLinkRequest, ResolveOutcome},
    services::{AppState, ShortLinkService},
    store::{KeyValueStore, MemoryStore, SqliteStore},
    utils::{Clock, ManualClock},
    AppError,
};

fn test_config() -> Config {
    ConfigBuilder::new()
        .database_url("memory")
        .base_url("http://sho.rt")
        .build()
}

fn service_on(store: Arc<dyn KeyValueStore>) -> (ShortLinkService, ManualClock) {
    let clock = ManualClock::default();
    let service = ShortLinkService::new(store, &test_config(), Arc::new(clock.clone()));
    (service, clock)
}

fn memory_service() -> (ShortLinkService, ManualClock) {
    service_on(Arc::new(MemoryStore::new()))
}

fn count_events(entries: &[AuditLogEntry], event_type: &str) -> usize {
    entries.iter().filter(|e| e.event_type == event_type).count()
}

// =====================================
// سناریوهای سرویس
// =====================================
mod service_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// لینک یک‌دقیقه‌ای: یک resolve موفق، بعد از ۶۱ ثانیه منقضی
    #[tokio::test]
    async fn test_one_minute_link_lifecycle() {
        let (service, clock) = memory_service();

        let record = service
            .create_short_link(CreateLinkRequest::new("https://a.com").validity_mins(1))
            .await
            .unwrap();
        assert_eq!(
            record.expires_at.timestamp_millis() - record.created_at.timestamp_millis(),
            60_000
        );

        let first = service.resolve_short_link(&record.code, None).await.unwrap();
        let first = first.record().unwrap();
        assert_eq!(first.clicks, 1);
        assert_eq!(first.history.len(), 1);

        clock.advance(Duration::seconds(61));
        let second = service.resolve_short_link(&record.code, None).await.unwrap();
        assert_eq!(second, ResolveOutcome::Expired);

        let stored = service.get_short_link(&record.code).await.unwrap();
        assert_eq!(stored.clicks, 1);
    }

    /// کد سفارشی تکراری: دومی Conflict، اولی دست نخورده
    #[tokio::test]
    async fn test_duplicate_custom_code() {
        let (service, _) = memory_service();

        let first = service
            .create_short_link(CreateLinkRequest::new("https://a.com").custom_code("abc"))
            .await
            .unwrap();
        let second = service
            .create_short_link(CreateLinkRequest::new("https://b.com").custom_code("abc"))
            .await;

        tokio_test::assert_err!(second.as_ref());
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(service.get_short_link("abc").await.unwrap(), first);
        assert_eq!(service.list_short_links().await.unwrap().len(), 1);
    }

    /// resolve کد ناموجود دقیقا یک رویداد miss ثبت میکنه
    #[tokio::test]
    async fn test_unknown_code_logs_exactly_one_miss() {
        let (service, _) = memory_service();

        let outcome = service.resolve_short_link("ghost", None).await.unwrap();

        assert_eq!(outcome, ResolveOutcome::NotFound);
        let entries = service.get_audit_log().await.unwrap();
        assert_eq!(count_events(&entries, event_types::SHORTLINK_MISS), 1);
        assert_eq!(entries[2].event_type, event_types::ACTION_START);
        assert_eq!(entries[0].event_type, event_types::ACTION_SUCCESS);
    }

    /// هر resolve دقیقا یک کلیک و یک entry اضافه میکنه
    #[tokio::test]
    async fn test_resolve_increments_by_exactly_one() {
        let (service, clock) = memory_service();
        let record = service
            .create_short_link(CreateLinkRequest::new("https://a.com"))
            .await
            .unwrap();

        for n in 1..=5u64 {
            clock.advance(Duration::seconds(1));
            let outcome = service
                .resolve_short_link(&record.code, Some("https://news.site"))
                .await
                .unwrap();
            let resolved = outcome.record().unwrap();

            assert_eq!(resolved.clicks, n);
            assert_eq!(resolved.history.len() as u64, n);
            assert_eq!(resolved.history[0].ts, clock.now());
            assert_eq!(resolved.last_accessed, Some(clock.now()));
        }
    }

    #[tokio::test]
    async fn test_delete_then_resolve_misses() {
        let (service, _) = memory_service();
        service
            .create_short_link(CreateLinkRequest::new("https://a.com").custom_code("gone"))
            .await
            .unwrap();

        service.delete_short_link("gone").await.unwrap();
        service.delete_short_link("gone").await.unwrap();

        assert_eq!(
            service.resolve_short_link("gone", None).await.unwrap(),
            ResolveOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (service, clock) = memory_service();
        for code in ["one", "two", "three"] {
            service
                .create_short_link(CreateLinkRequest::new("https://a.com").custom_code(code))
                .await
                .unwrap();
            clock.advance(Duration::seconds(1));
        }

        let codes: Vec<String> = service
            .list_short_links()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect();

        assert_eq!(codes, vec!["three", "two", "one"]);
    }

    #[tokio::test]
    async fn test_audit_log_never_exceeds_cap() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let config = ConfigBuilder::new().database_url("memory").audit_log_cap(10).build();
        let service = ShortLinkService::new(store, &config, Arc::new(ManualClock::default()));

        for _ in 0..20 {
            service.resolve_short_link("nope", None).await.unwrap();
        }

        let entries = service.get_audit_log().await.unwrap();
        assert_eq!(entries.len(), 10);
        // newest-first
        assert!(entries.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_clear_audit_log() {
        let (service, _) = memory_service();
        service.resolve_short_link("nope", None).await.unwrap();

        tokio_test::assert_ok!(service.clear_audit_log().await);

        assert!(service.get_audit_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_inputs_are_rejected() {
        let (service, _) = memory_service();

        for request in [
            CreateLinkRequest::new("   "),
            CreateLinkRequest::new("not a url"),
            CreateLinkRequest::new("https://a.com").custom_code("ab"),
            CreateLinkRequest::new("https://a.com").custom_code("has space"),
            CreateLinkRequest::new("https://a.com").validity_mins(0),
        ] {
            let result = service.create_short_link(request).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{result:?}");
        }

        assert!(service.list_short_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let (service, _) = memory_service();
        let mut links = service.subscribe_links();
        let mut audit = service.subscribe_audit();

        service
            .create_short_link(CreateLinkRequest::new("https://a.com").custom_code("abc"))
            .await
            .unwrap();

        assert!(links.recv().await.is_ok());
        assert_eq!(audit.recv().await.unwrap().event_type, event_types::ACTION_START);
    }
}

// =====================================
// SQLite Backend
// =====================================
mod sqlite_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_lifecycle_on_sqlite() {
        let store = SqliteStore::in_memory().await.unwrap();
        let (service, clock) = service_on(Arc::new(store));

        let record = service
            .create_short_link(CreateLinkRequest::new("https://a.com").custom_code("abc"))
            .await
            .unwrap();
        service
            .resolve_short_link("abc", Some("https://ref.io"))
            .await
            .unwrap();

        let stored = service.get_short_link("abc").await.unwrap();
        assert_eq!(stored.created_at, record.created_at);
        assert_eq!(stored.clicks, 1);
        assert_eq!(stored.history[0].referrer.as_deref(), Some("https://ref.io"));

        clock.advance(Duration::minutes(31));
        assert!(service.resolve_short_link("abc", None).await.unwrap().is_expired());
    }

    #[tokio::test]
    async fn test_concurrent_resolves_on_sqlite() {
        let store = SqliteStore::in_memory().await.unwrap();
        let (service, _) = service_on(Arc::new(store));
        service
            .create_short_link(CreateLinkRequest::new("https://a.com").custom_code("abc"))
            .await
            .unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.resolve_short_link("abc", None).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.get_short_link("abc").await.unwrap().clicks, 10);
    }
}

// =====================================
// تست‌های HTTP (Router)
// =====================================
mod http_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use shortlink_registry::api::create_router;
    use tower::ServiceExt;

    fn app() -> (Router, ManualClock) {
        let clock = ManualClock::default();
        let state = AppState::with_clock(
            Arc::new(MemoryStore::new()),
            test_config(),
            Arc::new(clock.clone()),
        );
        (create_router(state), clock)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn create_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/links")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_redirect() {
        let (app, _) = app();

        let (status, body) = send(
            &app,
            create_request(json!({"longUrl": "https://a.com/x", "customCode": "abc"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["shortUrl"], "http://sho.rt/abc");
        assert_eq!(body["data"]["status"], "active");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/abc?ref=newsletter")
                    .header(header::REFERER, "https://ignored.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "https://a.com/x");
        assert!(response.headers().contains_key("x-request-id"));

        let (_, stats) = send(&app, get("/links/abc")).await;
        assert_eq!(stats["data"]["clicks"], 1);
        assert_eq!(stats["data"]["history"][0]["referrer"], "newsletter");
    }

    #[tokio::test]
    async fn test_redirect_unknown_and_expired() {
        let (app, clock) = app();
        send(
            &app,
            create_request(json!({"longUrl": "https://a.com", "customCode": "short", "validityMins": 1})),
        )
        .await;

        let (status, _) = send(&app, get("/nothing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        clock.advance(Duration::seconds(61));
        let (status, body) = send(&app, get("/short")).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(body["status_code"], 410);
    }

    #[tokio::test]
    async fn test_create_validation_and_conflict_statuses() {
        let (app, _) = app();

        let (status, _) = send(&app, create_request(json!({"longUrl": ""}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        send(&app, create_request(json!({"longUrl": "https://a.com", "customCode": "dup"}))).await;
        let (status, _) =
            send(&app, create_request(json!({"longUrl": "https://b.com", "customCode": "dup"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let bad_json = Request::builder()
            .method("POST")
            .uri("/links")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, bad_json).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_route_names_cannot_be_claimed_as_codes() {
        let (app, _) = app();

        for code in ["health", "logs", "links"] {
            let (status, body) = send(
                &app,
                create_request(json!({"longUrl": "https://a.com", "customCode": code})),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{code}");
            assert!(body["message"].as_str().unwrap().contains("reserved routes"), "{code}");
        }

        let (_, links) = send(&app, get("/links")).await;
        assert_eq!(links["data"], json!([]));

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_json_resolve_shapes() {
        let (app, _) = app();
        send(&app, create_request(json!({"longUrl": "https://a.com", "customCode": "abc"}))).await;

        let resolve = |code: &str| {
            Request::builder()
                .method("POST")
                .uri(format!("/links/{code}/resolve"))
                .body(Body::empty())
                .unwrap()
        };

        let (_, found) = send(&app, resolve("abc")).await;
        assert_eq!(found["found"], true);
        assert_eq!(found["record"]["clicks"], 1);

        let (_, missing) = send(&app, resolve("zzz")).await;
        assert_eq!(missing, json!({"found": false}));
    }

    #[tokio::test]
    async fn test_logs_and_delete() {
        let (app, _) = app();
        send(&app, create_request(json!({"longUrl": "https://a.com", "customCode": "abc"}))).await;

        let delete = Request::builder()
            .method("DELETE")
            .uri("/links/abc")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, delete).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, links) = send(&app, get("/links")).await;
        assert_eq!(links["data"], json!([]));

        let (_, logs) = send(&app, get("/logs")).await;
        assert_eq!(logs["data"][0]["eventType"], "action.success");
        assert_eq!(logs["data"][1]["eventType"], "shortlink.deleted");

        let clear = Request::builder()
            .method("DELETE")
            .uri("/logs")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, clear).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, logs) = send(&app, get("/logs")).await;
        assert_eq!(logs["data"], json!([]));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();

        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], true);
    }
}

// =====================================
// Property-Based Tests
// =====================================
mod property_tests {
    use proptest::prelude::*;
    use shortlink_registry::services::CodeGenerator;

    fn follows_rule(code: &str) -> bool {
        let len = code.chars().count();
        (3..=20).contains(&len)
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    proptest! {
        /// کد سفارشی معتبره اگه و فقط اگه طول و کاراکترها درست باشن
        #[test]
        fn custom_code_valid_iff_rule(code in "\\PC{0,25}") {
            prop_assert_eq!(CodeGenerator::is_valid_custom(&code), follows_rule(&code));
        }

        /// ورودی‌های نزدیک به قانون
        #[test]
        fn near_rule_codes(code in "[A-Za-z0-9_\\- .!]{0,24}") {
            prop_assert_eq!(CodeGenerator::is_valid_custom(&code), follows_rule(&code));
        }

        /// کدهای تولیدی همیشه طول درست و کاراکترهای مجاز دارن
        #[test]
        fn generated_codes_follow_rule(len in 3usize..=20) {
            let code = CodeGenerator::generate(len);
            prop_assert_eq!(code.len(), len);
            prop_assert!(CodeGenerator::is_valid_custom(&code));
        }
    }
}
