//! Live tests against a Redis server.
//!
//! Every test flushes the database it connects to. Point `REDIS_URL` at a
//! disposable instance.

use bench_core::{
    BackendAdapter, BenchmarkRunner, ColumnDef, ColumnKind, Dataset, DatasetSchema, IdRange,
    Patch, PatchRule, Record, Scenario, ScenarioPlan, Target, Value,
};
use bench_redis::RedisAdapter;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://redis:6379/15".to_string())
}

fn comments(count: i64) -> Dataset {
    let schema = DatasetSchema::new(
        vec![
            ColumnDef::new("PostCommentID", ColumnKind::Int),
            ColumnDef::new("UserID", ColumnKind::Int),
            ColumnDef::new("Content", ColumnKind::Text),
        ],
        "PostCommentID",
    );
    let records = (1..=count)
        .map(|i| {
            Record::new()
                .with("PostCommentID", Value::Int(i))
                .with("UserID", Value::Int(i % 3))
                .with("Content", Value::Text(format!("comment {i}")))
        })
        .collect();
    Dataset::new("UserPostComment", schema, records)
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_redis_crud() -> Result<(), Box<dyn std::error::Error>> {
    let data = comments(12);
    let target = Target::new("UserPostComment", data.schema().clone());
    let mut adapter = RedisAdapter::connect(&redis_url()).await?;

    adapter.reset(&target).await?;
    adapter.reset(&target).await?;
    assert_eq!(adapter.insert_batch(&target, data.records()).await?, 12);
    assert_eq!(adapter.retrieve_range(&target, IdRange::new(1, 5)).await?, 5);
    assert_eq!(adapter.retrieve_range(&target, IdRange::new(10, 20)).await?, 3);

    let patch = Patch::new("Content", Value::Text("edited".into()));
    assert_eq!(adapter.update_all(&target, &patch).await?, 12);
    assert_eq!(adapter.delete_all(&target).await?, 12);
    assert_eq!(adapter.retrieve_range(&target, IdRange::new(1, 12)).await?, 0);

    Box::new(adapter).close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_redis_hash_scenarios() -> Result<(), Box<dyn std::error::Error>> {
    let data = comments(30);
    let mut adapter = RedisAdapter::connect(&redis_url()).await?;

    let plan = ScenarioPlan::new(Scenario::InsertHash, 3);
    let mut runner = BenchmarkRunner::new(plan, &data, "UserPostComment")?;
    let bundle = runner.run(&mut adapter).await?;
    assert!(bundle.result.iter().all(|r| r.size == 30));

    // The last iteration is not flushed
    assert_eq!(adapter.retrieve_hash("UserPostComment").await?, 30);

    let plan = ScenarioPlan::new(Scenario::RetrieveHash, 3);
    let mut runner = BenchmarkRunner::new(plan, &data, "UserPostComment")?;
    let bundle = runner.run(&mut adapter).await?;
    assert_eq!(bundle.operation, "RetrieveHash");
    assert!(bundle.result.iter().all(|r| r.size == 1));

    Box::new(adapter).close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_redis_write_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let data = comments(50);
    let mut adapter = RedisAdapter::connect(&redis_url()).await?;

    let plan = ScenarioPlan::new(Scenario::WriteCycle, 5).with_patch(PatchRule::Fixed(
        Patch::new("Content", Value::Text("x".repeat(500))),
    ));
    let mut runner = BenchmarkRunner::new(plan, &data, "UserPostComment")?;
    let bundle = runner.run(&mut adapter).await?;

    let sizes: Vec<usize> = bundle.result.iter().map(|r| r.size).collect();
    assert_eq!(sizes, vec![10, 20, 30, 40, 50]);

    Box::new(adapter).close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_redis_id_scoped_operations() -> Result<(), Box<dyn std::error::Error>> {
    let data = comments(20);
    let target = Target::new("UserPostComment", data.schema().clone());
    let mut adapter = RedisAdapter::connect(&redis_url()).await?;

    adapter.reset(&target).await?;
    adapter.insert_batch(&target, data.prefix(10)).await?;

    // Only the ten stored records match
    assert_eq!(adapter.update_records(&target, data.records()).await?, 10);
    assert_eq!(adapter.retrieve_ids(&target, &[1, 2, 15]).await?, 2);
    assert_eq!(adapter.delete_ids(&target, &[1, 2, 3]).await?, 3);
    assert_eq!(adapter.retrieve_range(&target, IdRange::new(1, 10)).await?, 7);

    // The keyspace walk still finds what is left
    assert_eq!(adapter.delete_all(&target).await?, 7);

    Box::new(adapter).close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "Requires a running Redis server"]
async fn test_redis_delete_slice_shrinks_store() -> Result<(), Box<dyn std::error::Error>> {
    let data = comments(40);
    let target = Target::new("UserPostComment", data.schema().clone());
    let mut adapter = RedisAdapter::connect(&redis_url()).await?;

    adapter.reset(&target).await?;
    adapter.insert_batch(&target, data.records()).await?;

    let plan = ScenarioPlan::new(Scenario::DeleteSlice, 4);
    let mut runner = BenchmarkRunner::new(plan, &data, "UserPostComment")?;
    let bundle = runner.run(&mut adapter).await?;
    assert_eq!(bundle.operation, "Delete");
    assert_eq!(adapter.retrieve_range(&target, IdRange::new(1, 40)).await?, 0);

    Box::new(adapter).close().await?;
    Ok(())
}
