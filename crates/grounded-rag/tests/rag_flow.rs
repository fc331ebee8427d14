//! End-to-end ingestion and query tests against in-process providers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use grounded_rag::{Error, RagService, VectorIndex};

#[tokio::test]
async fn test_paris_scenario() {
    let service = geography_service(50, 10);

    let chunks = service.ingest(PARIS, "geo.txt").await.unwrap();
    let ids: Vec<_> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["geo.txt-chunk-0", "geo.txt-chunk-1"]);

    let answer = service.answer("What is Paris known for?", 1).await.unwrap();
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(answer.sources[0].id, "geo.txt-chunk-1");
    assert!(answer.sources[0].content.contains("Eiffel Tower"));
    assert!(!answer.answer.is_empty());
    assert!(answer.answer.contains("Eiffel Tower"));
    assert!((answer.confidence - 0.8).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_sources_sorted_by_similarity() {
    let service = geography_service(50, 10);
    service.ingest(PARIS, "geo.txt").await.unwrap();

    let answer = service.ask("What is Paris known for?").await.unwrap();
    let ids: Vec<_> = answer.sources.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["geo.txt-chunk-1", "geo.txt-chunk-0"]);
    assert!(answer.sources.iter().all(|c| c.embedding.is_some()));
}

#[tokio::test]
async fn test_empty_inputs_rejected() {
    let service = geography_service(50, 10);

    let err = service.answer("", 4).await.unwrap_err();
    assert!(matches!(err, Error::EmptyQuestion));

    let err = service.ingest("", "x.txt").await.unwrap_err();
    assert!(matches!(err, Error::EmptyDocument(_)));
    assert!(service.index().is_empty());
}

#[test]
fn test_empty_document_blocking() {
    let service = geography_service(50, 10);
    let result = tokio_test::block_on(service.ingest("   \n", "blank.txt"));
    tokio_test::assert_err!(result);
}

#[tokio::test]
async fn test_empty_index_answers_without_sources() {
    let service = geography_service(50, 10);
    let answer = service.answer("What is Paris known for?", 4).await.unwrap();
    assert!(answer.sources.is_empty());
    assert_eq!(answer.answer, INSUFFICIENT);
}

#[tokio::test]
async fn test_round_trip_finds_unique_sentence() {
    let service = RagService::new(
        &config(1000, 200),
        Arc::new(HashingEmbedder::new(256)),
        Arc::new(QuotingCompleter::default()),
    )
    .unwrap();

    let docs = [
        ("budget.txt", "The quarterly budget was approved by the finance committee."),
        ("garden.txt", "Tomatoes need six hours of direct sunlight every day."),
        ("ferry.txt", "The night ferry to Helsinki departs from pier seven."),
        ("oven.txt", "Preheat the oven before baking sourdough loaves."),
    ];
    for (name, text) in docs {
        tokio_test::assert_ok!(service.ingest(text, name).await);
    }

    let answer = service
        .answer("The night ferry to Helsinki departs from pier seven.", 1)
        .await
        .unwrap();
    assert_eq!(answer.sources[0].metadata.source, "ferry.txt");
    assert!(answer.answer.contains("Helsinki"));
}

#[tokio::test]
async fn test_embedding_failure_commits_nothing() {
    let service = RagService::new(
        &config(50, 10),
        Arc::new(FailingEmbedder),
        Arc::new(QuotingCompleter::default()),
    )
    .unwrap();

    let err = service.ingest(PARIS, "geo.txt").await.unwrap_err();
    assert!(matches!(err, Error::RetrievalFailed(_)));
    assert!(service.index().is_empty());

    let err = service.ask("What is Paris known for?").await.unwrap_err();
    assert!(matches!(err, Error::RetrievalFailed(_)));
}

#[tokio::test]
async fn test_completion_failure_surfaces_generation_failed() {
    let service = RagService::new(
        &config(50, 10),
        Arc::new(KeywordEmbedder::geography()),
        Arc::new(FailingCompleter),
    )
    .unwrap();
    service.ingest(PARIS, "geo.txt").await.unwrap();

    let err = service.ask("What is Paris known for?").await.unwrap_err();
    assert!(matches!(err, Error::GenerationFailed(ref m) if m.contains("unavailable")));
}

#[tokio::test]
async fn test_invalid_chunk_config_rejected() {
    let result = RagService::new(
        &config(100, 100),
        Arc::new(KeywordEmbedder::geography()),
        Arc::new(QuotingCompleter::default()),
    );
    assert!(matches!(result, Err(Error::InvalidChunkConfig { .. })));
}

#[tokio::test]
async fn test_dimension_mismatch_across_pipelines() {
    let index = Arc::new(VectorIndex::new());
    let first = RagService::with_index(
        &config(50, 10),
        Arc::new(KeywordEmbedder::geography()),
        Arc::new(QuotingCompleter::default()),
        index.clone(),
    )
    .unwrap();
    let second = RagService::with_index(
        &config(50, 10),
        Arc::new(HashingEmbedder::new(8)),
        Arc::new(QuotingCompleter::default()),
        index.clone(),
    )
    .unwrap();

    first.ingest(PARIS, "geo.txt").await.unwrap();
    let err = second.ingest("Another document entirely.", "other.txt").await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 12, actual: 8 }));
    assert_eq!(index.len(), 2);

    let err = second.ask("anything").await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
}

#[tokio::test]
async fn test_reingestion_duplicates_chunks() {
    let service = geography_service(50, 10);
    service.ingest(PARIS, "geo.txt").await.unwrap();
    service.ingest(PARIS, "geo.txt").await.unwrap();

    assert_eq!(service.index().len(), 4);
    let answer = service.answer("What is Paris known for?", 2).await.unwrap();
    // Identical scores keep insertion order
    assert_eq!(answer.sources[0].id, "geo.txt-chunk-1");
    assert_eq!(answer.sources[1].id, "geo.txt-chunk-1");
}

#[tokio::test(start_paused = true)]
async fn test_completion_deadline() {
    let mut config = config(50, 10);
    config.llm.request_timeout_secs = Some(2);
    let service = RagService::new(
        &config,
        Arc::new(KeywordEmbedder::geography()),
        Arc::new(SlowCompleter(Duration::from_secs(30))),
    )
    .unwrap();
    service.ingest(PARIS, "geo.txt").await.unwrap();

    let err = service.ask("What is Paris known for?").await.unwrap_err();
    assert!(matches!(err, Error::GenerationFailed(ref m) if m.contains("timed out")));
}

#[tokio::test]
async fn test_dropped_ingestion_commits_nothing() {
    let service = Arc::new(
        RagService::new(
            &config(50, 10),
            Arc::new(PendingEmbedder),
            Arc::new(QuotingCompleter::default()),
        )
        .unwrap(),
    );

    let task = {
        let service = service.clone();
        tokio::spawn(async move { service.ingest(PARIS, "geo.txt").await })
    };

    // The index stays readable while the embedding call is outstanding
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(service.index().search(&[1.0], 4).unwrap().is_empty());

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(service.index().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingest_and_query() {
    let service = Arc::new(geography_service(50, 10));
    service.ingest(PARIS, "seed.txt").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.ingest(PARIS, &format!("geo-{}.txt", i)).await.map(|c| c.len())
        }));
    }
    let mut queries = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        queries.push(tokio::spawn(async move {
            service.answer("What is Paris known for?", 3).await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 2);
    }
    for query in queries {
        let answer = query.await.unwrap().unwrap();
        assert!(!answer.sources.is_empty());
        // Whole documents land atomically, so the best hit is always a chunk-1
        assert!(answer.sources[0].id.ends_with("-chunk-1"));
    }

    assert_eq!(service.index().len(), 18);
    assert_eq!(service.index().sources().len(), 9);
}
