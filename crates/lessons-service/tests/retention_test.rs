//! Tests for the group retention sweeper.

use lessons_core::models::group::CreateGroup;
use lessons_core::repository::GroupRepository;
use lessons_db::repository::SurrealGroupRepository;
use lessons_service::config::RetentionConfig;
use lessons_service::retention::GroupRetentionSweeper;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tokio::sync::watch;

#[tokio::test]
async fn sweep_purges_only_expired_groups() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lessons_db::run_migrations(&db).await.unwrap();
    let groups = SurrealGroupRepository::new(db.clone());

    let expired = groups.create(CreateGroup::default()).await.unwrap();
    let recent = groups.create(CreateGroup::default()).await.unwrap();
    groups.soft_delete(recent.id).await.unwrap();
    db.query("UPDATE type::record('user_group', $id) SET deleted_at = time::now() - 31d")
        .bind(("id", expired.id.to_string()))
        .await
        .unwrap();

    let sweeper = GroupRetentionSweeper::new(groups.clone(), RetentionConfig::default());
    assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
    assert_eq!(sweeper.sweep_once().await.unwrap(), 0);
}

#[tokio::test]
async fn sweeper_stops_on_shutdown() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lessons_db::run_migrations(&db).await.unwrap();

    let sweeper = GroupRetentionSweeper::new(
        SurrealGroupRepository::new(db),
        RetentionConfig {
            group_retention_days: 30,
            sweep_interval_secs: 1,
        },
    );
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(sweeper.run(rx));

    tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .expect("sweeper should stop")
        .unwrap();
}
