// ==========================================
// 可用量 API 集成测试
// ==========================================
// 场景: 日程入参校验、错误分类、预约提交映射
// ==========================================

mod test_helpers;

use aid_allocation_engine::api::{ApiError, AvailabilityApi};
use aid_allocation_engine::domain::TransferStatus;
use aid_allocation_engine::engine::AvailabilityEngine;
use aid_allocation_engine::repository::{
    ItemTemplateRepository, StockLotRepository, TransferRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use test_helpers::*;

fn build_api(conn: &Arc<Mutex<Connection>>) -> AvailabilityApi {
    AvailabilityApi::new(Arc::new(AvailabilityEngine::new(
        Arc::new(ItemTemplateRepository::from_connection(Arc::clone(conn))),
        Arc::new(StockLotRepository::from_connection(Arc::clone(conn))),
        Arc::new(TransferRepository::from_connection(Arc::clone(conn))),
    )))
}

fn seed_stock(conn: &Arc<Mutex<Connection>>) {
    let item_repo = ItemTemplateRepository::from_connection(Arc::clone(conn));
    let stock_repo = StockLotRepository::from_connection(Arc::clone(conn));
    seed_item(&item_repo, "rice", "大米 5kg");
    seed_lot(&stock_repo, "rice", "b-001", 10.0, date(2024, 6, 20), date(2024, 6, 1));
}

#[tokio::test]
async fn test_malformed_schedule_rejected() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_stock(&conn);

    let api = build_api(&conn);
    let now = datetime(2024, 6, 1, 0, 0);

    // 日期格式错误
    let schedule = vec![schedule_dto("06/09/2024", "10:00", "18:00")];
    let err = api
        .get_availability("rice", "b-001", &schedule, now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedSchedule(_)));
    assert!(err.is_client_correctable());

    // 开始不早于结束
    let schedule = vec![schedule_dto("2024-06-09", "18:00", "10:00")];
    let err = api
        .get_availability("rice", "b-001", &schedule, now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedSchedule(_)));

    // 一条损坏整体拒绝,不做部分受理
    let schedule = vec![
        schedule_dto("2024-06-09", "10:00", "18:00"),
        schedule_dto("2024-06-10", "morning", "18:00"),
    ];
    let err = api
        .get_availability("rice", "b-001", &schedule, now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MalformedSchedule(_)));
}

#[tokio::test]
async fn test_get_availability_and_reserve_roundtrip() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_stock(&conn);

    let api = build_api(&conn);
    let transfer_repo = TransferRepository::from_connection(Arc::clone(&conn));
    let now = datetime(2024, 6, 1, 0, 0);
    let schedule = vec![schedule_dto("2024-06-09", "10:00", "18:00")];

    let result = api
        .get_availability("rice", "b-001", &schedule, now)
        .await
        .unwrap();
    assert_eq!(result.available_quantity, 10.0);

    let request = api
        .reserve("rice", "b-001", 6.0, &schedule, now)
        .await
        .unwrap();
    assert_eq!(request.status, TransferStatus::Pending);
    let lines = transfer_repo.list_line_items(&request.transfer_id).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 6.0);

    // 预留后可用量下降
    let result = api
        .get_availability("rice", "b-001", &schedule, now)
        .await
        .unwrap();
    assert_eq!(result.available_quantity, 4.0);

    // 超出预算 → 可重试的"bad request"类错误
    let err = api
        .reserve("rice", "b-001", 6.0, &schedule, now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InsufficientAvailability { .. }));
    assert!(err.is_client_correctable());
}

#[tokio::test]
async fn test_unknown_item_maps_to_not_found() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_stock(&conn);

    let api = build_api(&conn);
    let now = datetime(2024, 6, 1, 0, 0);
    let schedule = vec![schedule_dto("2024-06-09", "10:00", "18:00")];

    let err = api
        .get_availability("ghost", "b-001", &schedule, now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_batch_over_shared_schedule() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let item_repo = ItemTemplateRepository::from_connection(Arc::clone(&conn));
    let stock_repo = StockLotRepository::from_connection(Arc::clone(&conn));
    seed_item(&item_repo, "rice", "大米 5kg");
    seed_item(&item_repo, "milk", "牛奶 1L");
    seed_lot(&stock_repo, "rice", "b-001", 10.0, date(2024, 6, 20), date(2024, 6, 1));
    // milk 过期太早,不计入该窗口
    seed_lot(&stock_repo, "milk", "b-001", 5.0, date(2024, 6, 9), date(2024, 6, 1));

    let api = build_api(&conn);
    let now = datetime(2024, 6, 1, 0, 0);
    let schedule = vec![schedule_dto("2024-06-09", "10:00", "18:00")];

    let results = api
        .get_availability_batch(
            &["rice".to_string(), "milk".to_string(), "ghost".to_string()],
            "b-001",
            &schedule,
            now,
        )
        .await
        .unwrap();
    // ghost 省略;milk 存在但该窗口下无可用批次
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].item_id, "rice");
    assert_eq!(results[0].available_quantity, 10.0);
    assert_eq!(results[1].item_id, "milk");
    assert_eq!(results[1].available_quantity, 0.0);
}
