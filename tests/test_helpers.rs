// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据构造等功能
// ==========================================
#![allow(dead_code)]

use aid_allocation_engine::api::ScheduleEntryDto;
use aid_allocation_engine::db;
use aid_allocation_engine::domain::{
    AidItem, AidItemStatus, AidRequest, ItemTemplate, ScheduledWindow, StockLot,
};
use aid_allocation_engine::engine::{BranchNotification, NotificationPublisher};
use aid_allocation_engine::repository::{
    AidRequestRepository, ItemTemplateRepository, StockLotRepository,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试连接(统一 PRAGMA),包装为仓储共享形式
pub fn open_test_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = db::open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

// ==========================================
// 日期/时间构造
// ==========================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

pub fn window(day: NaiveDate, start: (u32, u32), end: (u32, u32)) -> ScheduledWindow {
    ScheduledWindow::new(
        day,
        NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    )
    .unwrap()
}

pub fn schedule_dto(day: &str, start: &str, end: &str) -> ScheduleEntryDto {
    ScheduleEntryDto {
        day: day.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

// ==========================================
// 数据种子
// ==========================================

/// 写入物品模板
pub fn seed_item(repo: &ItemTemplateRepository, item_id: &str, name: &str) {
    repo.insert(&ItemTemplate::new(item_id, name)).unwrap();
}

/// 写入有效库存批次,返回批次ID
pub fn seed_lot(
    repo: &StockLotRepository,
    item_id: &str,
    branch_id: &str,
    quantity: f64,
    expiration: NaiveDate,
    created: NaiveDate,
) -> String {
    let lot = StockLot::new_valid(item_id, branch_id, quantity, expiration, created);
    let lot_id = lot.lot_id.clone();
    repo.insert(&lot).unwrap();
    lot_id
}

/// 写入援助请求及其时段,返回请求ID
pub fn seed_request(
    repo: &AidRequestRepository,
    windows: Vec<ScheduledWindow>,
    created_at: NaiveDateTime,
) -> String {
    let request = AidRequest {
        request_id: Uuid::new_v4().to_string(),
        beneficiary_id: None,
        windows,
        created_at,
    };
    let request_id = request.request_id.clone();
    repo.insert_request(&request).unwrap();
    request_id
}

/// 写入已受理的援助物品条目,返回条目ID
pub fn seed_accepted_item(
    repo: &AidRequestRepository,
    request_id: &str,
    item_id: &str,
    quantity: f64,
    attributes: &[&str],
    created_at: NaiveDateTime,
) -> String {
    let item = AidItem {
        aid_item_id: Uuid::new_v4().to_string(),
        request_id: request_id.to_string(),
        item_id: item_id.to_string(),
        quantity,
        status: AidItemStatus::Accepted,
        created_at,
    };
    let aid_item_id = item.aid_item_id.clone();
    let attrs: Vec<(String, String)> = attributes
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("attr_{}", i), v.to_string()))
        .collect();
    repo.insert_item(&item, &attrs).unwrap();
    aid_item_id
}

// ==========================================
// 通知记录器
// ==========================================

/// 记录型通知发布者: 捕获巡检发布的全部通知供断言
#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<BranchNotification>>,
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(
        &self,
        notification: BranchNotification,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.published.lock().unwrap().push(notification);
        Ok(())
    }
}

/// 故障型通知发布者: 始终失败(验证 fire-and-forget 语义)
pub struct FailingPublisher;

impl NotificationPublisher for FailingPublisher {
    fn publish(
        &self,
        _notification: BranchNotification,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("通知通道不可用".into())
    }
}
