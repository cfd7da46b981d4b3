//! Whole-workflow test through the public facade

use serde_json::json;
use tempfile::TempDir;
use vellum::{
    ChangeType, DiffSummary, HistoryConfig, HistoryFilter, RestoreOptions, TagType,
    VersionHistoryManager, VersionOverrides, VersionStatus,
};

fn schema(tables: &[&str]) -> String {
    let tables: Vec<_> = tables
        .iter()
        .map(|name| json!({"name": name, "columns": [{"name": "id", "type": "integer"}]}))
        .collect();
    json!({"database": "shop", "tables": tables}).to_string()
}

#[test]
fn edit_tag_branch_and_restore() {
    let dir = TempDir::new().unwrap();
    let config = HistoryConfig {
        auto_save_interval_ms: 0,
        ..HistoryConfig::default()
    };
    let history = VersionHistoryManager::open(config, dir.path()).unwrap();

    let v1 = history
        .create_version(
            &schema(&["users"]),
            VersionOverrides::default().message("initial").author("ana"),
        )
        .unwrap();
    let v2 = history
        .create_version(
            &schema(&["users", "orders"]),
            VersionOverrides::default()
                .change_type(ChangeType::Minor)
                .tag("orders-added"),
        )
        .unwrap();
    assert_eq!(v2.metadata.version_label.to_string(), "1.1.0");
    assert_eq!(v2.metadata.status, VersionStatus::Tagged);

    let delta = history.compare_versions(&v1.id(), &v2.id()).unwrap();
    let summary = DiffSummary::from_delta(&delta);
    assert!(summary.added >= 1);
    assert!(summary.touched.contains("tables"));

    history.create_tag("first", &v1.id(), TagType::Release).unwrap();
    let experiment = history.create_branch("experiment", Some(v1.id())).unwrap();
    history.switch_branch(&experiment.id).unwrap();
    let v3 = history
        .create_version(&schema(&["users", "audit_log"]), VersionOverrides::default())
        .unwrap();
    assert_eq!(v3.parent_id(), Some(v1.id()));

    let on_experiment = history.get_version_history(&HistoryFilter {
        branch_id: Some(experiment.id),
        ..HistoryFilter::default()
    });
    assert_eq!(on_experiment.len(), 1);

    let restored = history
        .restore_version(RestoreOptions::new(v2.id()))
        .unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&restored.content).unwrap(),
        serde_json::from_str::<serde_json::Value>(&schema(&["users", "orders"])).unwrap()
    );
    assert_eq!(history.list_tags().len(), 2);
    assert_eq!(history.storage_metrics().total_versions, 3);
}
