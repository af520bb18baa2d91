//! Plugin fan-out lifecycle and orchestrator state machine, end to end.

mod support;

use std::sync::Arc;

use reelix_core::config::EngineConfig;
use reelix_core::scrape::{
    RunOutcome, RunPhase, ScrapeOptions, ScrapeOrchestrator,
};
use reelix_model::{
    CandidateStatus, DiscoveredEmbed, MediaDescriptor, PlayableStream,
    ScrapeEvent, StreamFlag, StreamKind, StreamResult,
};

use support::ScriptedRuntime;

fn stream(id: &str) -> PlayableStream {
    PlayableStream {
        id: id.to_string(),
        kind: StreamKind::Hls,
        playlist: "https://cdn.example/pl.m3u8".to_string(),
        flags: vec![StreamFlag::CorsAllowed],
        captions: Vec::new(),
    }
}

fn winning_result(source_id: &str) -> StreamResult {
    StreamResult::new(stream(source_id), source_id)
}

#[tokio::test]
async fn full_lifecycle_reflects_every_event() {
    let events = vec![
        ScrapeEvent::init(vec!["p1".to_string(), "p2".to_string()]),
        ScrapeEvent::start("p1"),
        ScrapeEvent::discover_embeds(
            "p1",
            vec![DiscoveredEmbed {
                id: "e1".to_string(),
                embed_scraper_id: "x".to_string(),
            }],
        ),
        ScrapeEvent::update("e1", CandidateStatus::Pending, None, None, 50),
        ScrapeEvent::update("e1", CandidateStatus::Success, None, None, 100),
    ];
    let runtime = Arc::new(ScriptedRuntime::new(
        events,
        Some(StreamResult {
            embed_id: Some("e1".to_string()),
            ..winning_result("p1")
        }),
    ));
    let engine =
        ScrapeOrchestrator::new(EngineConfig::default(), runtime);

    let outcome = engine
        .start_run(MediaDescriptor::movie("tt1"), ScrapeOptions::default())
        .await
        .unwrap();

    let RunOutcome::Success(result) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(result.source_id, "p1");
    assert_eq!(result.embed_id.as_deref(), Some("e1"));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, RunPhase::Resolved);

    // Tree: p1 with one discovered child, p2 untouched.
    assert_eq!(snapshot.order.len(), 2);
    assert_eq!(snapshot.order[0].id, "p1");
    assert_eq!(snapshot.order[0].children, ["e1"]);
    assert!(snapshot.order[1].children.is_empty());

    // Store: winner promoted on completion, embed success from its own
    // update, p2 never started.
    assert_eq!(snapshot.sources["p1"].status, CandidateStatus::Success);
    assert_eq!(snapshot.sources["e1"].status, CandidateStatus::Success);
    assert_eq!(snapshot.sources["p2"].status, CandidateStatus::Waiting);

    // Labels resolved through the registry catalog.
    assert_eq!(snapshot.sources["p1"].name, "Provider One");
    assert_eq!(snapshot.sources["e1"].name, "Embed X");
    assert_eq!(snapshot.sources["e1"].parent_id.as_deref(), Some("p1"));
}

#[tokio::test]
async fn exhausted_fanout_is_not_found_without_speculative_promotion() {
    let events = vec![
        ScrapeEvent::init(vec!["p1".to_string()]),
        ScrapeEvent::start("p1"),
    ];
    let runtime = Arc::new(ScriptedRuntime::new(events, None));
    let engine =
        ScrapeOrchestrator::new(EngineConfig::default(), runtime);

    let outcome = engine
        .start_run(MediaDescriptor::movie("tt1"), ScrapeOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::NotFound);
    // p1 was last-attempted and still pending, but no output was produced:
    // it is never finalized to success.
    assert_eq!(
        engine.snapshot().sources["p1"].status,
        CandidateStatus::Pending
    );
}

#[tokio::test]
async fn incremental_embed_discovery_appends_in_order() {
    let events = vec![
        ScrapeEvent::init(vec!["p1".to_string()]),
        ScrapeEvent::start("p1"),
        ScrapeEvent::discover_embeds(
            "p1",
            vec![
                DiscoveredEmbed {
                    id: "e1".to_string(),
                    embed_scraper_id: "x".to_string(),
                },
                DiscoveredEmbed {
                    id: "e2".to_string(),
                    embed_scraper_id: "x".to_string(),
                },
            ],
        ),
        // A later page of the same source discovers one more embed.
        ScrapeEvent::discover_embeds(
            "p1",
            vec![DiscoveredEmbed {
                id: "e3".to_string(),
                embed_scraper_id: "x".to_string(),
            }],
        ),
    ];
    let runtime = Arc::new(ScriptedRuntime::new(events, None));
    let engine =
        ScrapeOrchestrator::new(EngineConfig::default(), runtime);

    engine
        .start_run(MediaDescriptor::movie("tt1"), ScrapeOptions::default())
        .await
        .unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.order[0].children, ["e1", "e2", "e3"]);
}

#[tokio::test]
async fn events_for_unknown_candidates_never_abort_the_run() {
    let events = vec![
        ScrapeEvent::init(vec!["p1".to_string()]),
        // A misbehaving collaborator updates an id it never introduced.
        ScrapeEvent::update("ghost", CandidateStatus::Pending, None, None, 10),
        ScrapeEvent::start("p1"),
    ];
    let runtime =
        Arc::new(ScriptedRuntime::new(events, Some(winning_result("p1"))));
    let engine =
        ScrapeOrchestrator::new(EngineConfig::default(), runtime);

    let outcome = engine
        .start_run(MediaDescriptor::movie("tt1"), ScrapeOptions::default())
        .await
        .unwrap();

    assert!(outcome.is_success());
    let snapshot = engine.snapshot();
    assert!(!snapshot.sources.contains_key("ghost"));
    assert_eq!(snapshot.sources["p1"].status, CandidateStatus::Success);
}

#[tokio::test]
async fn preferred_order_is_passed_through_unchanged() {
    let runtime = Arc::new(ScriptedRuntime::new(Vec::new(), None));
    let engine =
        ScrapeOrchestrator::new(
            EngineConfig::default(),
            Arc::clone(&runtime) as Arc<dyn reelix_core::ProviderRuntime>,
        );

    engine
        .start_run(
            MediaDescriptor::movie("tt1"),
            ScrapeOptions {
                preferred_order: vec!["p2".to_string(), "p1".to_string()],
                ..ScrapeOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(*runtime.seen_order.lock().unwrap(), ["p2", "p1"]);
}

#[tokio::test]
async fn runtime_fault_surfaces_as_cancelled_with_detail() {
    let runtime = Arc::new(ScriptedRuntime::failing("plugin host crashed"));
    let engine =
        ScrapeOrchestrator::new(EngineConfig::default(), runtime);

    let outcome = engine
        .start_run(MediaDescriptor::movie("tt1"), ScrapeOptions::default())
        .await
        .unwrap();

    let RunOutcome::Cancelled { detail } = outcome else {
        panic!("expected cancelled, got {outcome:?}");
    };
    assert!(detail.unwrap().contains("plugin host crashed"));
    assert_eq!(engine.phase(), RunPhase::Cancelled);
}

#[tokio::test]
async fn concurrent_run_for_a_different_descriptor_is_rejected() {
    let gate = Arc::new(tokio::sync::Notify::new());
    let events = vec![
        ScrapeEvent::init(vec!["p1".to_string()]),
        ScrapeEvent::start("p1"),
    ];
    let runtime = Arc::new(
        ScriptedRuntime::new(events, Some(winning_result("p1")))
            .holding(Arc::clone(&gate)),
    );
    let engine = Arc::new(ScrapeOrchestrator::new(
        EngineConfig::default(),
        runtime,
    ));

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .start_run(
                    MediaDescriptor::movie("tt1"),
                    ScrapeOptions::default(),
                )
                .await
        })
    };

    // Wait until the first run holds the engine and has started p1.
    while engine
        .snapshot()
        .sources
        .get("p1")
        .map(|candidate| candidate.status)
        != Some(CandidateStatus::Pending)
    {
        tokio::task::yield_now().await;
    }
    assert_eq!(engine.phase(), RunPhase::Running);

    let err = engine
        .start_run(MediaDescriptor::movie("tt2"), ScrapeOptions::default())
        .await
        .unwrap_err();
    match err {
        reelix_core::EngineError::ConcurrentRunRejected { active, requested } => {
            assert_eq!(active.id, "tt1");
            assert_eq!(requested.id, "tt2");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The original run is untouched and completes normally.
    assert_eq!(engine.snapshot().sources["p1"].status, CandidateStatus::Pending);
    gate.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert!(outcome.is_success());
    assert_eq!(
        engine.snapshot().sources["p1"].status,
        CandidateStatus::Success
    );
}

#[tokio::test]
async fn reset_mid_run_discards_all_state_and_cancels_the_run() {
    let gate = Arc::new(tokio::sync::Notify::new());
    let events = vec![
        ScrapeEvent::init(vec!["p1".to_string()]),
        ScrapeEvent::start("p1"),
    ];
    let runtime = Arc::new(
        ScriptedRuntime::new(events, Some(winning_result("p1")))
            .holding(Arc::clone(&gate)),
    );
    let engine = Arc::new(ScrapeOrchestrator::new(
        EngineConfig::default(),
        runtime,
    ));

    let run = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .start_run(
                    MediaDescriptor::movie("tt1"),
                    ScrapeOptions::default(),
                )
                .await
        })
    };
    while engine
        .snapshot()
        .sources
        .get("p1")
        .map(|candidate| candidate.status)
        != Some(CandidateStatus::Pending)
    {
        tokio::task::yield_now().await;
    }

    engine.reset();

    // Snapshot taken immediately after reset is empty.
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, RunPhase::Idle);
    assert!(snapshot.sources.is_empty());
    assert!(snapshot.order.is_empty());

    // The abandoned run resolves cancelled and leaks nothing, even though
    // its runtime produced an output on the way out.
    let outcome = run.await.unwrap().unwrap();
    assert_eq!(outcome, RunOutcome::Cancelled { detail: None });
    assert!(engine.snapshot().sources.is_empty());
    assert_eq!(engine.phase(), RunPhase::Idle);
}

#[tokio::test]
async fn a_new_run_after_reset_starts_from_a_clean_slate() {
    let events = vec![
        ScrapeEvent::init(vec!["p1".to_string()]),
        ScrapeEvent::start("p1"),
    ];
    let runtime = Arc::new(ScriptedRuntime::new(events, None));
    let engine =
        ScrapeOrchestrator::new(EngineConfig::default(), runtime);

    engine
        .start_run(MediaDescriptor::movie("tt1"), ScrapeOptions::default())
        .await
        .unwrap();
    assert!(!engine.snapshot().sources.is_empty());

    engine.reset();
    assert!(engine.snapshot().sources.is_empty());

    let outcome = engine
        .start_run(MediaDescriptor::movie("tt2"), ScrapeOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::NotFound);
    assert_eq!(engine.snapshot().sources.len(), 1);
}
