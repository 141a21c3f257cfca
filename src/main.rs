// ==========================================
// 公益物资调配平台 - 过期巡检入口
// ==========================================
// 定位: 外部日度调度器(cron/systemd timer)每日调用一次;
//       引擎自身不拥有定时器或后台线程
// 用法: expiration-sweep [db_path]
// ==========================================

use aid_allocation_engine::api::SweepApi;
use aid_allocation_engine::domain::today_utc;
use aid_allocation_engine::engine::{ExpirationSweepEngine, NoOpNotificationPublisher};
use aid_allocation_engine::repository::{StockLotRepository, TransferRepository};
use aid_allocation_engine::{db, logging};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 默认数据库路径(应用数据目录)
fn default_db_path() -> String {
    let mut path: PathBuf = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("aid-allocation");
    if let Err(e) = std::fs::create_dir_all(&path) {
        tracing::warn!(error = %e, "应用数据目录创建失败,回退到当前目录");
        path = PathBuf::from(".");
    }
    path.push("aid_platform.db");
    path.to_string_lossy().to_string()
}

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 过期巡检", aid_allocation_engine::APP_NAME);
    tracing::info!("系统版本: {}", aid_allocation_engine::VERSION);
    tracing::info!("==================================================");

    // 数据库路径: 参数优先,否则应用数据目录
    let db_path = std::env::args().nth(1).unwrap_or_else(default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let conn = match db::open_sqlite_connection(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "数据库连接失败");
            std::process::exit(1);
        }
    };
    if let Err(e) = db::init_schema(&conn) {
        tracing::error!(error = %e, "schema 初始化失败");
        std::process::exit(1);
    }

    // 共享连接装配仓储与引擎
    let conn = Arc::new(Mutex::new(conn));
    let stock_repo = Arc::new(StockLotRepository::from_connection(Arc::clone(&conn)));
    let transfer_repo = Arc::new(TransferRepository::from_connection(Arc::clone(&conn)));
    // 通知通道由平台的送达层适配;巡检入口仅记录汇总
    let publisher = Arc::new(NoOpNotificationPublisher);
    let sweep_engine = Arc::new(ExpirationSweepEngine::new(
        stock_repo,
        transfer_repo,
        publisher,
    ));
    let sweep_api = SweepApi::new(sweep_engine);

    // 巡检日期在入口处取一次,引擎内部不再取时钟
    let today = today_utc();
    match sweep_api.run_expiration_sweep(today).await {
        Ok(summary) => {
            tracing::info!(
                processed = summary.branches_processed,
                failed = summary.branches_failed,
                warned = summary.lots_warned,
                expired = summary.lots_expired,
                "巡检结束"
            );
            if summary.branches_failed > 0 {
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "巡检执行失败");
            std::process::exit(1);
        }
    }
}
