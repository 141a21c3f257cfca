// ==========================================
// 过期巡检引擎集成测试
// ==========================================
// 场景: 明日过期预警口径、今日下架、幂等、通知聚合
// ==========================================

mod test_helpers;

use aid_allocation_engine::domain::LotStatus;
use aid_allocation_engine::engine::{
    BranchNotificationKind, ExpirationSweepEngine, NoOpNotificationPublisher,
    NotificationPublisher,
};
use aid_allocation_engine::repository::{
    ItemTemplateRepository, StockLotRepository, TransferRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use test_helpers::*;

struct SweepFixture {
    stock_repo: Arc<StockLotRepository>,
    transfer_repo: Arc<TransferRepository>,
    item_repo: ItemTemplateRepository,
}

fn build_fixture(conn: &Arc<Mutex<Connection>>) -> SweepFixture {
    SweepFixture {
        stock_repo: Arc::new(StockLotRepository::from_connection(Arc::clone(conn))),
        transfer_repo: Arc::new(TransferRepository::from_connection(Arc::clone(conn))),
        item_repo: ItemTemplateRepository::from_connection(Arc::clone(conn)),
    }
}

#[tokio::test]
async fn test_sweep_warns_and_retires_per_branch() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let fixture = build_fixture(&conn);
    let today = date(2024, 6, 5);

    seed_item(&fixture.item_repo, "bread", "面包");
    seed_item(&fixture.item_repo, "rice", "大米 5kg");
    seed_item(&fixture.item_repo, "milk", "牛奶 1L");

    // b-001: bread 明日过期且无预留 → 计入预警
    seed_lot(&fixture.stock_repo, "bread", "b-001", 6.0, date(2024, 6, 6), today);
    // b-001: rice 明日过期但有在途预留 → 视为将发放,不计预警
    seed_lot(&fixture.stock_repo, "rice", "b-001", 4.0, date(2024, 6, 6), today);
    fixture
        .transfer_repo
        .create_reservation_checked("rice", "b-001", 2.0, today, datetime(2024, 6, 5, 8, 0))
        .unwrap();
    // b-001: milk 今日过期 + 一批滞留(昨日过期未处理) → 均下架
    let today_lot = seed_lot(&fixture.stock_repo, "milk", "b-001", 3.0, today, date(2024, 6, 1));
    let stale_lot = seed_lot(&fixture.stock_repo, "milk", "b-001", 2.0, date(2024, 6, 4), date(2024, 6, 1));
    // b-002: 远期批次,无事发生
    seed_lot(&fixture.stock_repo, "bread", "b-002", 9.0, date(2024, 7, 1), today);

    let publisher = Arc::new(RecordingPublisher::default());
    let engine = ExpirationSweepEngine::new(
        Arc::clone(&fixture.stock_repo),
        Arc::clone(&fixture.transfer_repo),
        Arc::clone(&publisher) as Arc<dyn NotificationPublisher>,
    );

    let summary = engine.run(today).await.unwrap();
    assert_eq!(summary.branches_processed, 2);
    assert_eq!(summary.branches_failed, 0);
    assert_eq!(summary.lots_warned, 1);
    assert_eq!(summary.lots_expired, 2);

    // 批次状态已流转
    assert_eq!(
        fixture.stock_repo.find_by_id(&today_lot).unwrap().unwrap().status,
        LotStatus::Expired
    );
    assert_eq!(
        fixture.stock_repo.find_by_id(&stale_lot).unwrap().unwrap().status,
        LotStatus::Expired
    );

    // 通知按站点聚合: b-001 各一条,b-002 无
    let published = publisher.published.lock().unwrap();
    assert_eq!(published.len(), 2);
    let warning = published
        .iter()
        .find(|n| n.kind == BranchNotificationKind::ExpiryWarning)
        .unwrap();
    assert_eq!(warning.branch_id, "b-001");
    assert_eq!(warning.lot_count, 1);
    assert!(warning.message.contains("b-001"));
    let expired = published
        .iter()
        .find(|n| n.kind == BranchNotificationKind::ExpiredToday)
        .unwrap();
    assert_eq!(expired.branch_id, "b-001");
    assert_eq!(expired.lot_count, 2);
}

#[tokio::test]
async fn test_sweep_rerun_is_idempotent() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let fixture = build_fixture(&conn);
    let today = date(2024, 6, 5);

    seed_item(&fixture.item_repo, "milk", "牛奶 1L");
    seed_lot(&fixture.stock_repo, "milk", "b-001", 3.0, today, date(2024, 6, 1));

    let engine = ExpirationSweepEngine::new(
        Arc::clone(&fixture.stock_repo),
        Arc::clone(&fixture.transfer_repo),
        Arc::new(NoOpNotificationPublisher),
    );

    let first = engine.run(today).await.unwrap();
    assert_eq!(first.lots_expired, 1);

    // 重跑: 终态收敛,无新流转
    let second = engine.run(today).await.unwrap();
    assert_eq!(second.lots_expired, 0);
}

#[tokio::test]
async fn test_mark_expired_idempotent_count() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let fixture = build_fixture(&conn);

    seed_item(&fixture.item_repo, "milk", "牛奶 1L");
    let lot_a = seed_lot(&fixture.stock_repo, "milk", "b-001", 3.0, date(2024, 6, 5), date(2024, 6, 1));
    let lot_b = seed_lot(&fixture.stock_repo, "milk", "b-001", 2.0, date(2024, 6, 5), date(2024, 6, 1));

    let ids = vec![lot_a, lot_b];
    assert_eq!(fixture.stock_repo.mark_expired(&ids).unwrap(), 2);
    // 二次调用: 同一终态,新流转数为 0
    assert_eq!(fixture.stock_repo.mark_expired(&ids).unwrap(), 0);
}

#[tokio::test]
async fn test_publisher_failure_does_not_abort_sweep() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let fixture = build_fixture(&conn);
    let today = date(2024, 6, 5);

    seed_item(&fixture.item_repo, "milk", "牛奶 1L");
    let lot_id = seed_lot(&fixture.stock_repo, "milk", "b-001", 3.0, today, date(2024, 6, 1));

    let engine = ExpirationSweepEngine::new(
        Arc::clone(&fixture.stock_repo),
        Arc::clone(&fixture.transfer_repo),
        Arc::new(FailingPublisher),
    );

    // 通知通道故障: fire-and-forget,下架照常完成
    let summary = engine.run(today).await.unwrap();
    assert_eq!(summary.branches_failed, 0);
    assert_eq!(summary.lots_expired, 1);
    assert_eq!(
        fixture.stock_repo.find_by_id(&lot_id).unwrap().unwrap().status,
        LotStatus::Expired
    );
}
