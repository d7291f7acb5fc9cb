//! Integration coverage for resuming a batch job across two `BatchEngine`
//! runs sharing the same completed/skip logs on disk, per spec.md §8's
//! resume scenario: a second run against the same item list must skip
//! everything the first run completed and only process what's left.

use ldprepo_batch::{BatchConfig, BatchEngine, ItemLog, ItemOutcome, ItemSource};

fn open_logs(dir: &std::path::Path) -> (ItemLog, ItemLog) {
    let completed = ItemLog::open(
        dir.join("completed.csv"),
        ["number", "path", "timestamp", "title", "uri"],
        "path",
    )
    .unwrap();
    let skipped =
        ItemLog::open(dir.join("skipped.csv"), ["number", "path", "timestamp", "reason"], "path")
            .unwrap();
    (completed, skipped)
}

#[tokio::test]
async fn test_second_run_skips_items_completed_by_the_first() {
    let dir = tempfile::tempdir().unwrap();
    let items = vec!["item1".to_string(), "item2".to_string(), "item3".to_string()];

    let (completed, skipped) = open_logs(dir.path());
    let engine =
        BatchEngine::new(ItemSource::List(items.clone()), completed, skipped, None, BatchConfig::default());
    let first = engine
        .run(|_, path| async move {
            if path == "item2" {
                Err(ldprepo_batch::BatchError::DataRead { item: path, reason: "transient".into() })
            } else {
                Ok(ItemOutcome::Completed { uri: format!("http://ex.org/{path}"), title: path })
            }
        })
        .await
        .unwrap();
    assert_eq!(first.completed, 2);
    assert_eq!(first.failed, 0); // DataRead errors advance silently, never counted as failed

    // A fresh engine opened against the same log files picks up where the
    // first run left off.
    let (completed, skipped) = open_logs(dir.path());
    let engine =
        BatchEngine::new(ItemSource::List(items), completed, skipped, None, BatchConfig::default());

    let mut processed = Vec::new();
    let second = engine
        .run(|_, path| {
            processed.push(path.clone());
            async move { Ok(ItemOutcome::Completed { uri: format!("http://ex.org/{path}"), title: path }) }
        })
        .await
        .unwrap();

    assert_eq!(second.skipped, 2, "item1 and item3 were already completed");
    assert_eq!(second.completed, 1, "only item2 still needed processing");
    assert_eq!(processed, vec!["item2".to_string()]);
}
