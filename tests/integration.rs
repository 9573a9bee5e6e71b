use inventory_audit_rust::{
    api::{handle, Command},
    db::{JsonFileStore, KeyValueStore, MemoryStore},
    models::{Classification, RawRow, SessionInfo},
    service::{discrepancy, HistoryLedger, StaticUser, HISTORY_KEY},
    AuditService, AuditSession, ReconcileError,
};
use serde_json::json;

fn scenario_rows() -> Vec<RawRow> {
    vec![
        json!({"Código": "A1", "Producto": "Widget", "Cantidad": 10}),
        json!({"Código": "B2", "Producto": "Gadget", "Cantidad": 5}),
    ]
    .into_iter()
    .filter_map(|r| r.as_object().cloned())
    .collect()
}

#[test]
fn widget_gadget_scenario() {
    let mut session = AuditSession::new();
    assert_eq!(session.load_catalog(&scenario_rows()), 2);

    for _ in 0..8 {
        session.scan("A1").unwrap();
    }
    for _ in 0..5 {
        session.scan("B2").unwrap();
    }

    let before = session.counts().statistics_snapshot();
    assert_eq!(
        session.scan("Z9"),
        Err(ReconcileError::UnknownProduct("Z9".to_string()))
    );
    assert_eq!(session.counts().statistics_snapshot(), before);

    let stats = session.aggregate();
    assert_eq!(stats.total_products, 2);
    assert_eq!(stats.scanned_products, 2);
    assert_eq!(stats.discrepancy_count, 1);
    assert_eq!(stats.progress_percentage, 100);
    assert_eq!(stats.match_percentage, 50);

    let report = session.full_report();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].code, "A1");
    assert_eq!(report[0].difference, -2);
    assert_eq!(report[0].classification, Classification::Shortage);
    assert_eq!(report[1].code, "B2");
    assert_eq!(report[1].difference, 0);
    assert_eq!(report[1].classification, Classification::Match);
}

#[test]
fn reloading_discards_previous_counts() {
    let mut session = AuditSession::new();
    session.load_catalog(&scenario_rows());
    session.scan("A1").unwrap();

    let other: Vec<RawRow> = vec![
        json!({"SKU": "X1", "Nombre": "Caja", "Stock": "3"}),
        json!({"SKU": "  ", "Nombre": "Sin código"}),
    ]
    .into_iter()
    .filter_map(|r| r.as_object().cloned())
    .collect();

    assert_eq!(session.load_catalog(&other), 1);
    assert!(session.counts().is_empty());
    assert_eq!(session.catalog().products()[0].code, "X1");
}

#[test]
fn zero_edit_matches_remove() {
    let mut a = AuditSession::new();
    let mut b = AuditSession::new();
    for s in [&mut a, &mut b] {
        s.load_catalog(&scenario_rows());
        s.scan("A1").unwrap();
        s.scan("B2").unwrap();
    }

    a.set_quantity("A1", 0).unwrap();
    b.remove_entry("A1");

    assert_eq!(a.counts().get("A1"), None);
    assert_eq!(a.full_report(), b.full_report());
    assert_eq!(a.aggregate(), b.aggregate());
}

#[test]
fn classification_is_total_over_catalog() {
    let mut session = AuditSession::new();
    session.load_catalog(&scenario_rows());
    session.scan("B2").unwrap();

    let stats = session.aggregate();
    let products = session.catalog().products();
    let non_match = products
        .iter()
        .filter(|p| discrepancy::classify(p, session.counts()) != Classification::Match)
        .count();
    assert_eq!(stats.discrepancy_count, non_match);
}

#[test]
fn history_survives_reopen_and_evicts_oldest() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = AuditService::new(
        JsonFileStore::new(dir.path()),
        Box::new(StaticUser(Some("Auditor Principal".to_string()))),
    );
    service.session_mut().load_catalog(&scenario_rows());

    for n in 1..=7 {
        let info = SessionInfo::new("2024-05-01", &format!("Tienda {}", n), "Ana", None).unwrap();
        service.session_mut().save_info(info);
        service.finalize_report().unwrap();
    }

    let ledger = HistoryLedger::open(JsonFileStore::new(dir.path()));
    let stores: Vec<_> = ledger.entries().iter().map(|e| e.store.clone()).collect();
    assert_eq!(stores, vec!["Tienda 7", "Tienda 6", "Tienda 5", "Tienda 4", "Tienda 3"]);
}

#[test]
fn corrupt_history_file_starts_empty() {
    let mut store = MemoryStore::new();
    store.set(HISTORY_KEY, "[{\"date\": 1}]").unwrap();
    let service = AuditService::new(store, Box::new(StaticUser(None)));
    assert!(service.history().is_empty());
}

#[tokio::test]
async fn command_flow_from_csv_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("inventario.csv");
    std::fs::write(&csv_path, "Código,Producto,Cantidad\nA1,Widget,10\nB2,Gadget,5\n").unwrap();
    let report_dir = dir.path().join("reports");

    let mut service = AuditService::new(MemoryStore::new(), Box::new(StaticUser(None)));

    let run = |line: &str| Command::parse(line).unwrap();
    let load = handle(&mut service, run(&format!(":load {}", csv_path.display())), &report_dir, 10).await;
    assert!(load.success, "{}", load.message);
    assert!(load.message.contains("2 productos"));

    let scan = handle(&mut service, run("A1"), &report_dir, 10).await;
    assert!(scan.success);
    assert!(scan.message.contains("Faltante detectado"));

    let unknown = handle(&mut service, run("Z9"), &report_dir, 10).await;
    assert!(!unknown.success);

    let bad_edit = handle(&mut service, run(":set A1 -2"), &report_dir, 10).await;
    assert!(!bad_edit.success);
    assert_eq!(service.session().counts().get("A1"), Some(1));

    let edit = handle(&mut service, run(":set A1 10"), &report_dir, 10).await;
    assert!(edit.success, "{}", edit.message);

    let early = handle(&mut service, run(":report"), &report_dir, 10).await;
    assert!(!early.success);

    let info = handle(&mut service, run(":info 2024-05-01|Tienda Centro|Ana|sin novedades"), &report_dir, 10).await;
    assert!(info.success);

    let report = handle(&mut service, run(":report"), &report_dir, 10).await;
    assert!(report.success, "{}", report.message);

    let written = std::fs::read_to_string(report_dir.join("inventario_Tienda_Centro_2024-05-01.csv")).unwrap();
    assert!(written.contains("A1,Widget,10,10,0,CORRECTO"));
    assert!(written.contains("B2,Gadget,5,0,-5,FALTANTE"));
    assert!(written.contains("Auditor,No identificado"));

    let history = handle(&mut service, run(":history"), &report_dir, 10).await;
    assert!(history.message.contains("Tienda Centro"));
    assert!(history.message.contains("Discrepancias: 1"));
}
