//! Integration tests for tiered question resolution

mod common;

use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tierqa::{AskError, Orchestrator, OrchestratorConfig, Source, StatusClass};
use tierqa_store::{CacheConfig, CacheTier, HealthStatus};

const REPLY: &str = r#"[7, "What is Rust?", null, "A systems programming language"]"#;

#[tokio::test]
async fn test_cache_hit_skips_store_and_generator() {
    let cache = memory_cache();
    cache
        .set_default("What is Rust?", &record(9, "What is Rust?", "cached"))
        .await;
    let store = FakeStore::new();
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(cache, store.clone(), generator.clone());

    let response = orch.ask("  WHAT IS RUST?  ").await.unwrap();

    assert_eq!(response.source, Source::Cache);
    assert_eq!(response.record.answer(), "cached");
    assert_eq!(store.finds(), 0);
    assert_eq!(store.upserts(), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_db_hit_populates_cache_without_generating() {
    let cache = memory_cache();
    let store = FakeStore::with_record(record(6, "What is Rust?", "from db")).await;
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(cache.clone(), store.clone(), generator.clone());

    let first = orch.ask("what is rust?").await.unwrap();
    assert_eq!(first.source, Source::Db);
    assert_eq!(first.record.answer(), "from db");
    assert_eq!(generator.calls(), 0);
    assert_eq!(store.upserts(), 0);
    assert!(cache.get("What is Rust?").await.is_some());

    let second = orch.ask("What is Rust?").await.unwrap();
    assert_eq!(second.source, Source::Cache);
    assert_eq!(store.finds(), 1);
}

#[tokio::test]
async fn test_full_miss_generates_once_and_back_fills() {
    let cache = memory_cache();
    let store = FakeStore::new();
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(cache.clone(), store.clone(), generator.clone());

    let response = orch.ask("  What is Rust?  ").await.unwrap();

    assert_eq!(response.source, Source::Llm);
    assert_eq!(response.record.score(), 7);
    assert_eq!(response.record.title(), "What is Rust?");
    assert_eq!(
        response.message,
        "Question: What is Rust?\nScore: 7\nAnswer: A systems programming language"
    );
    assert_eq!(generator.calls(), 1);
    assert_eq!(store.upserts(), 1);
    assert_eq!(store.stored("what is rust?").await, Some(response.record.clone()));
    assert_eq!(cache.get("what is rust?").await, Some(response.record));

    let again = orch.ask("What is Rust?").await.unwrap();
    assert_eq!(again.source, Source::Cache);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_title_is_original_question_not_echo() {
    let generator = FakeGenerator::replying(r#"[5, "a different question", null, "answer"]"#);
    let orch = orchestrator(memory_cache(), FakeStore::new(), generator);

    let response = orch.ask("Why is the sky blue?").await.unwrap();
    assert_eq!(response.record.title(), "Why is the sky blue?");
}

#[tokio::test]
async fn test_cache_failure_still_answers_from_db() {
    let store = FakeStore::with_record(record(4, "What is Rust?", "from db")).await;
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(down_cache(), store, generator.clone());

    let response = orch.ask("What is Rust?").await.unwrap();

    assert_eq!(response.source, Source::Db);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_disabled_cache_still_answers() {
    let cache = Arc::new(CacheTier::disabled(CacheConfig::default()));
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(cache, FakeStore::new(), generator);

    let response = orch.ask("What is Rust?").await.unwrap();
    assert_eq!(response.source, Source::Llm);
}

#[tokio::test]
async fn test_unreachable_store_is_storage_unavailable() {
    let store = FakeStore::new();
    store.unreachable.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(memory_cache(), store, generator.clone());

    let err = orch.ask("What is Rust?").await.unwrap_err();

    assert!(matches!(err, AskError::StorageUnavailable));
    assert_eq!(err.class(), StatusClass::UpstreamUnavailable);
    assert!(!err.detail().contains("admin123"));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_failed_query_is_a_miss() {
    let store = FakeStore::new();
    store.query_fails.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(memory_cache(), store, generator.clone());

    let response = orch.ask("What is Rust?").await.unwrap();

    assert_eq!(response.source, Source::Llm);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_write_back_failure_does_not_fail_request() {
    let store = FakeStore::new();
    store.upsert_fails.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(down_cache(), store.clone(), generator);

    let response = orch.ask("What is Rust?").await.unwrap();

    assert_eq!(response.source, Source::Llm);
    assert_eq!(store.upserts(), 1);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_empty_question_rejected_before_any_tier() {
    let store = FakeStore::new();
    let generator = FakeGenerator::replying(REPLY);
    let orch = orchestrator(memory_cache(), store.clone(), generator.clone());

    for question in ["", "   ", "\n\t"] {
        let err = orch.ask(question).await.unwrap_err();
        assert!(matches!(err, AskError::InputInvalid(_)));
        assert_eq!(err.class().http_status(), 400);
    }
    assert_eq!(store.finds(), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_generator_failures_are_classified() {
    let cases = [
        (Script::RateLimited, StatusClass::UpstreamRateLimited),
        (Script::Transient, StatusClass::UpstreamUnavailable),
        (Script::Unreachable, StatusClass::UpstreamUnavailable),
        (Script::Other, StatusClass::InternalError),
    ];

    for (script, expected) in cases {
        let store = FakeStore::new();
        let orch = orchestrator(memory_cache(), store.clone(), FakeGenerator::new(script));

        let err = orch.ask("What is Rust?").await.unwrap_err();
        assert_eq!(err.class(), expected, "{:?}", err);
        assert_eq!(store.upserts(), 0);
    }
}

#[tokio::test]
async fn test_malformed_reply_is_surfaced_with_raw_text() {
    let cache = memory_cache();
    let store = FakeStore::new();
    let generator = FakeGenerator::replying("I'd rather not say.");
    let orch = orchestrator(cache.clone(), store.clone(), generator);

    let err = orch.ask("What is Rust?").await.unwrap_err();

    match &err {
        AskError::UpstreamMalformedOutput { raw } => assert_eq!(raw, "I'd rather not say."),
        other => panic!("expected malformed output, got {:?}", other),
    }
    assert_eq!(err.class().http_status(), 502);
    assert_eq!(store.upserts(), 0);
    assert!(cache.get("What is Rust?").await.is_none());
}

#[tokio::test]
async fn test_generator_timeout_is_connectivity_failure() {
    let generator = FakeGenerator::new(Script::Slow(Duration::from_secs(30), REPLY.to_string()));
    let orch = Orchestrator::new(
        memory_cache(),
        FakeStore::new(),
        generator,
        OrchestratorConfig {
            generator_timeout: Duration::from_millis(100),
        },
    );

    let err = orch.ask("What is Rust?").await.unwrap_err();
    assert!(matches!(err, AskError::UpstreamConnectivityFailure(_)), "{:?}", err);
    assert_eq!(err.class().http_status(), 503);
}

#[tokio::test]
async fn test_concurrent_duplicates_converge_to_one_row() {
    let store = FakeStore::new();
    let generator = FakeGenerator::new(Script::Slow(Duration::from_millis(50), REPLY.to_string()));
    let orch = Arc::new(orchestrator(memory_cache(), store.clone(), generator.clone()));

    let requests = (0..4).map(|_| {
        let orch = orch.clone();
        tokio::spawn(async move { orch.ask("What is Rust?").await })
    });

    for result in futures::future::join_all(requests).await {
        assert_eq!(result.unwrap().unwrap().source, Source::Llm);
    }

    assert!(generator.calls() >= 1 && generator.calls() <= 4);
    assert_eq!(store.upserts(), generator.calls());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_case_variant_duplicates_converge_to_one_row() {
    let store = FakeStore::new();
    let generator = FakeGenerator::new(Script::Slow(Duration::from_millis(50), REPLY.to_string()));
    let orch = Arc::new(orchestrator(memory_cache(), store.clone(), generator.clone()));

    let questions = ["What is Rust?", "what is rust?", "WHAT IS RUST?"];
    let requests = questions.map(|question| {
        let orch = orch.clone();
        tokio::spawn(async move { orch.ask(question).await })
    });

    for result in futures::future::join_all(requests).await {
        assert_eq!(result.unwrap().unwrap().source, Source::Llm);
    }

    assert!(generator.calls() >= 1 && generator.calls() <= 3);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_health_reports_each_tier() {
    let orch = orchestrator(memory_cache(), FakeStore::new(), FakeGenerator::replying(REPLY));
    let report = orch.health().await;
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.cache.backend, "memory");
    assert!(report.cache.reachable);
    assert_eq!(report.generator, "fake");
    assert_eq!(report.http_status_code(), 200);
}

#[tokio::test]
async fn test_health_degraded_without_cache() {
    let orch = orchestrator(down_cache(), FakeStore::new(), FakeGenerator::replying(REPLY));
    let report = orch.health().await;
    assert_eq!(report.status, HealthStatus::Degraded);
    assert!(!report.cache.reachable);
    assert_eq!(report.http_status_code(), 200);
}

#[tokio::test]
async fn test_health_degraded_when_configured_cache_failed_to_connect() {
    let cache = Arc::new(CacheTier::unavailable(CacheConfig::default()));
    let orch = orchestrator(cache, FakeStore::new(), FakeGenerator::replying(REPLY));

    let report = orch.health().await;
    assert_eq!(report.status, HealthStatus::Degraded);
    assert!(report.cache.expected);
    assert!(!report.cache.enabled);
}

#[tokio::test]
async fn test_health_healthy_when_cache_disabled_by_config() {
    let cache = Arc::new(CacheTier::disabled(CacheConfig::default()));
    let orch = orchestrator(cache, FakeStore::new(), FakeGenerator::replying(REPLY));

    let report = orch.health().await;
    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.cache.backend, "none");
    assert!(!report.cache.expected);
    assert!(!report.cache.reachable);
    assert_eq!(report.http_status_code(), 200);
}

#[tokio::test]
async fn test_health_unhealthy_when_store_is_down() {
    let store = FakeStore::new();
    store.unreachable.store(true, Ordering::SeqCst);
    let orch = orchestrator(memory_cache(), store, FakeGenerator::replying(REPLY));

    let report = orch.health().await;
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.http_status_code(), 503);
}
