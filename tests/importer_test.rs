// ==========================================
// 捐赠入库导入器集成测试
// ==========================================
// 场景: 行级容错、校验规则、落库核对
// ==========================================

mod test_helpers;

use aid_allocation_engine::importer::StockIntakeImporter;
use aid_allocation_engine::repository::{ItemTemplateRepository, StockLotRepository};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use test_helpers::*;

#[tokio::test]
async fn test_import_tolerates_bad_rows() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let item_repo = Arc::new(ItemTemplateRepository::from_connection(Arc::clone(&conn)));
    let stock_repo = Arc::new(StockLotRepository::from_connection(Arc::clone(&conn)));
    seed_item(&item_repo, "rice", "大米 5kg");
    seed_item(&item_repo, "milk", "牛奶 1L");

    // 2 行合法;4 行各有问题: 未知物品 / 日期格式 / 非正数量 / 已过期
    let mut csv_file = NamedTempFile::new().unwrap();
    writeln!(csv_file, "item_id,branch_id,quantity,expiration_date").unwrap();
    writeln!(csv_file, "rice,b-001,25.0,2024-06-20").unwrap();
    writeln!(csv_file, "milk,b-001,12.0,2024-06-15").unwrap();
    writeln!(csv_file, "ghost,b-001,5.0,2024-06-20").unwrap();
    writeln!(csv_file, "rice,b-001,5.0,20/06/2024").unwrap();
    writeln!(csv_file, "rice,b-001,-3.0,2024-06-20").unwrap();
    writeln!(csv_file, "rice,b-001,5.0,2024-05-01").unwrap();
    csv_file.flush().unwrap();

    let importer = StockIntakeImporter::new(Arc::clone(&item_repo), Arc::clone(&stock_repo));
    let today = date(2024, 6, 1);
    let summary = importer.import_file(csv_file.path(), today).unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 4);
    assert_eq!(summary.row_errors.len(), 4);

    // 落库核对: 截止日 06-10(+1天边际=06-11) → rice 25, milk 12
    assert_eq!(
        stock_repo
            .valid_quantity_usable_from("rice", "b-001", date(2024, 6, 10))
            .unwrap(),
        25.0
    );
    assert_eq!(
        stock_repo
            .valid_quantity_usable_from("milk", "b-001", date(2024, 6, 10))
            .unwrap(),
        12.0
    );

    // 汇总文案经消息目录渲染
    let message = summary.message();
    assert!(message.contains('2'));
    assert!(message.contains('4'));
}

#[tokio::test]
async fn test_import_missing_file_fails() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    let item_repo = Arc::new(ItemTemplateRepository::from_connection(Arc::clone(&conn)));
    let stock_repo = Arc::new(StockLotRepository::from_connection(Arc::clone(&conn)));

    let importer = StockIntakeImporter::new(item_repo, stock_repo);
    assert!(importer
        .import_file("/nonexistent/intake.csv", date(2024, 6, 1))
        .is_err());
}
