//! Shared fixture: a small Go-style service graph checked in allowed mode.
//!
//! ```text
//! example.com/app/api    -> domain, db, fmt
//! example.com/app/db     -> database/sql, domain
//! example.com/app/domain -> fmt
//! ```
//!
//! `api` may import `domain`, `db` may import `domain`, and nothing covers
//! `domain`, so `api -> db` and `domain -> fmt` are the two violations.
#![allow(dead_code)]

use importmaps_core::{
    CheckReport, CheckSettings, Graph, Mode, OutputFormat, Rule, Ruleset, Stdlib, Thresholds,
    check_graph,
};
use std::path::PathBuf;

pub const MODULE_PATH: &str = "example.com/app";

pub const GRAPH_JSON: &str = r#"{
  "example.com/app/api": ["example.com/app/domain", "example.com/app/db", "fmt"],
  "example.com/app/domain": ["fmt"],
  "example.com/app/db": ["database/sql", "example.com/app/domain"]
}"#;

pub fn graph() -> Graph {
    serde_json::from_str(GRAPH_JSON).expect("fixture graph is valid JSON")
}

pub fn allowed_rules() -> Ruleset {
    Ruleset::new(
        vec![],
        vec![
            Rule::compile(
                "^example.com/app/api",
                &["^example.com/app/domain$"],
                None,
                "allowed[0]",
            )
            .unwrap(),
            Rule::compile(
                "^example.com/app/db$",
                &["^example.com/app/domain$"],
                None,
                "allowed[1]",
            )
            .unwrap(),
        ],
    )
}

pub fn settings(metrics: bool) -> CheckSettings {
    CheckSettings {
        path: PathBuf::from("graph.json"),
        mode: Mode::Allowed,
        format: OutputFormat::Text,
        metrics,
        module_path: Some(MODULE_PATH.to_string()),
        stdlib: Stdlib::Go,
        output_file: None,
        thresholds: Thresholds::default(),
        rules: allowed_rules(),
    }
}

pub fn report(metrics: bool) -> CheckReport {
    check_graph(graph(), &settings(metrics))
}

/// Writes a small layered Rust crate under `root`:
///
/// ```text
/// crate                -> std
/// crate::api           -> crate::domain, crate::infra::db
/// crate::api::handlers -> crate::domain, serde, crate::infra::db
/// crate::domain        -> crate::domain::money (inline module)
/// crate::infra::db     -> crate::domain
/// ```
pub fn write_fixture_crate(root: &std::path::Path) {
    let files = [
        (
            "src/lib.rs",
            "pub mod api;\npub mod domain;\npub mod infra;\n\nuse std::collections::HashMap;\n",
        ),
        (
            "src/api/mod.rs",
            "use crate::domain::Order;\nuse crate::infra::db;\n\npub mod handlers;\n",
        ),
        (
            "src/api/handlers.rs",
            "use super::super::domain::Order;\nuse serde::Serialize;\n\n\
             pub fn handle() -> crate::infra::db::Pool {\n    todo!()\n}\n",
        ),
        (
            "src/domain.rs",
            "pub struct Order;\n\nmod money {\n    pub struct Cents;\n}\n\n\
             pub fn cents() -> money::Cents {\n    money::Cents\n}\n",
        ),
        ("src/infra/mod.rs", "pub mod db;\n"),
        ("src/infra/db.rs", "use crate::domain::Order;\n\npub struct Pool;\n"),
    ];

    for (path, content) in files {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}
