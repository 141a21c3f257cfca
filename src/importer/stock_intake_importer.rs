// ==========================================
// 公益物资调配平台 - 捐赠入库导入器
// ==========================================
// 职责: 解析入库 CSV 并落库为有效库存批次
// 流程: 解析 → 校验 → 落库
// 容错: 单行失败只记录并跳过,不中断整批
// ==========================================

use crate::domain::schedule::DATE_FORMAT;
use crate::domain::stock::StockLot;
use crate::i18n;
use crate::repository::item_repo::ItemTemplateRepository;
use crate::repository::stock_lot_repo::StockLotRepository;
use chrono::NaiveDate;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// 入库行与导入结果
// ==========================================

/// 入库 CSV 行
///
/// 列: item_id, branch_id, quantity, expiration_date
#[derive(Debug, Deserialize)]
struct IntakeRow {
    item_id: String,
    branch_id: String,
    quantity: f64,
    expiration_date: String,
}

/// 导入结果汇总
#[derive(Debug, Clone, Default)]
pub struct IntakeSummary {
    pub imported: usize,         // 成功落库行数
    pub skipped: usize,          // 跳过行数
    pub row_errors: Vec<String>, // 逐行错误描述(行号从1起,不含表头)
}

impl IntakeSummary {
    /// 渲染汇总文案(经消息目录)
    pub fn message(&self) -> String {
        i18n::t_with_args(
            "import.summary",
            &[
                ("imported", &self.imported.to_string()),
                ("skipped", &self.skipped.to_string()),
            ],
        )
    }
}

// ==========================================
// StockIntakeImporter - 捐赠入库导入器
// ==========================================
pub struct StockIntakeImporter {
    item_repo: Arc<ItemTemplateRepository>,
    stock_repo: Arc<StockLotRepository>,
}

impl StockIntakeImporter {
    /// 创建新的入库导入器
    pub fn new(item_repo: Arc<ItemTemplateRepository>, stock_repo: Arc<StockLotRepository>) -> Self {
        Self {
            item_repo,
            stock_repo,
        }
    }

    /// 导入入库 CSV 文件
    ///
    /// # 参数
    /// - path: CSV 文件路径(首行为表头)
    /// - today: 注入的入库日期
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_file(
        &self,
        path: impl AsRef<Path>,
        today: NaiveDate,
    ) -> Result<IntakeSummary, Box<dyn Error>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let mut summary = IntakeSummary::default();
        for (index, record) in reader.deserialize::<IntakeRow>().enumerate() {
            let line_no = index + 1;
            let row = match record {
                Ok(row) => row,
                Err(e) => {
                    summary.skipped += 1;
                    summary.row_errors.push(format!("第{}行: 解析失败: {}", line_no, e));
                    continue;
                }
            };
            if let Err(e) = self.import_row(&row, today) {
                summary.skipped += 1;
                summary.row_errors.push(format!("第{}行: {}", line_no, e));
                continue;
            }
            summary.imported += 1;
        }

        if !summary.row_errors.is_empty() {
            warn!(skipped = summary.skipped, "入库导入存在跳过行");
        }
        info!(imported = summary.imported, skipped = summary.skipped, "入库导入完成");
        Ok(summary)
    }

    /// 校验并落库单行
    fn import_row(&self, row: &IntakeRow, today: NaiveDate) -> Result<(), Box<dyn Error>> {
        if row.quantity <= 0.0 {
            return Err(format!("数量必须为正: {}", row.quantity).into());
        }
        let expiration = NaiveDate::parse_from_str(&row.expiration_date, DATE_FORMAT)
            .map_err(|_| format!("过期日期格式错误: {}", row.expiration_date))?;
        if expiration < today {
            return Err(format!("过期日期早于入库日期: {}", row.expiration_date).into());
        }
        if !self.item_repo.exists(&row.item_id)? {
            return Err(format!("物品不在目录中: {}", row.item_id).into());
        }

        let lot = StockLot::new_valid(
            row.item_id.clone(),
            row.branch_id.clone(),
            row.quantity,
            expiration,
            today,
        );
        self.stock_repo.insert(&lot)?;
        Ok(())
    }
}
