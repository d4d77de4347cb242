mod common;

use std::time::{Duration, Instant};

use common::MemoryDynamo;
use dynohelp::batch_writer::{BatchWriter, MAX_BATCH_WRITE_ITEMS};
use dynohelp::table_operations::async_truncate_table;
use dynohelp::{key_map, Error, Item, Key};

fn reading(sensor: &str, at: i64) -> Item {
    Item::new()
        .with("sensor", sensor)
        .with("at", at)
        .with("celsius", 21)
        .with("note", "x".repeat(64))
}

#[tokio::test]
async fn empty_table_truncates_immediately() {
    let store = MemoryDynamo::new(10).with_table("readings", &["sensor", "at"]);
    let report = async_truncate_table(&store, "readings").await.unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.pages, 1);
    assert!(store.batch_sizes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn truncate_removes_every_item() {
    for (count, page_size) in [(1, 10), (30, 7), (60, 25), (100, 1000)] {
        let store = MemoryDynamo::new(page_size).with_table("readings", &["sensor", "at"]);
        store.seed("readings", (0..count).map(|n| reading("s1", n)));

        let report = async_truncate_table(&store, "readings").await.unwrap();
        assert_eq!(report.deleted, count as usize);
        assert_eq!(store.len("readings"), 0, "page size {page_size}");
        assert!(store
            .batch_sizes
            .lock()
            .unwrap()
            .iter()
            .all(|&n| n <= MAX_BATCH_WRITE_ITEMS));
    }
}

#[tokio::test]
async fn truncate_scans_only_key_attributes() {
    let store = MemoryDynamo::new(5).with_table("readings", &["sensor", "at"]);
    store.seed("readings", (0..3).map(|n| reading("s1", n)));

    async_truncate_table(&store, "readings").await.unwrap();

    let scans = store.scans.lock().unwrap();
    let first = &scans[0];
    assert_eq!(first.projection_expression.as_deref(), Some("#k0, #k1"));
    let names = first.expression_attribute_names.as_ref().unwrap();
    assert_eq!(names["#k0"], "sensor");
    assert_eq!(names["#k1"], "at");
}

#[tokio::test]
async fn truncate_unknown_table_fails() {
    let store = MemoryDynamo::new(5);
    let err = async_truncate_table(&store, "gone").await.unwrap_err();
    assert!(matches!(err, Error::TableNotFound { .. }));
}

#[tokio::test]
async fn writer_flushes_full_batches() {
    let store = MemoryDynamo::new(100).with_table("readings", &["sensor", "at"]);
    let mut writer = BatchWriter::new(&store, "readings");
    for n in 0..60 {
        writer.put_item(&reading("s2", n)).await.unwrap();
    }
    assert_eq!(writer.pending(), 10);
    assert_eq!(writer.written(), 50);

    assert_eq!(writer.finish().await.unwrap(), 60);
    assert_eq!(*store.batch_sizes.lock().unwrap(), vec![25, 25, 10]);
    assert_eq!(store.len("readings"), 60);
}

#[tokio::test]
async fn writer_resends_unprocessed_requests() {
    let store = MemoryDynamo::new(100).with_table("readings", &["sensor", "at"]);
    store.seed("readings", (0..3).map(|n| reading("s3", n)));
    store.drop_last_write_for(2);

    let mut writer = BatchWriter::new(&store, "readings");
    for n in 0..3 {
        let key = key_map(&Key::new("sensor", "s3"), Some(&Key::new("at", n)));
        writer.delete_item(key).await.unwrap();
    }

    assert_eq!(writer.finish().await.unwrap(), 3);
    assert_eq!(store.len("readings"), 0);
    assert_eq!(*store.batch_sizes.lock().unwrap(), vec![3, 1, 1]);
}

#[tokio::test]
async fn writer_gives_up_when_writes_never_go_through() {
    let store = MemoryDynamo::new(100).with_table("readings", &["sensor", "at"]);
    store.seed("readings", [reading("s4", 0)]);
    store.drop_last_write_for(usize::MAX);

    let mut writer =
        BatchWriter::new(&store, "readings").with_retry(3, Duration::from_millis(5));
    let key = key_map(&Key::new("sensor", "s4"), Some(&Key::new("at", 0)));
    writer.delete_item(key).await.unwrap();

    let started = Instant::now();
    let result = tokio::time::timeout(Duration::from_secs(5), writer.finish())
        .await
        .expect("writer kept retrying");
    assert!(matches!(result, Err(Error::Throttling(_))));
    // 5ms + 10ms + 20ms of backoff between the four attempts.
    assert!(started.elapsed() >= Duration::from_millis(35));
    assert_eq!(*store.batch_sizes.lock().unwrap(), vec![1, 1, 1, 1]);
    assert_eq!(store.len("readings"), 1);
}
