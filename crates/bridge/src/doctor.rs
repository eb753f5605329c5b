//! Environment doctor
//!
//! Hosts embedding the library can call [`environment_report`] at startup
//! to confirm every subsystem actually works in the deployed environment,
//! not just that it linked. Each probe is a tiny end-to-end exercise and
//! each result is logged, so a broken deployment shows up in the host log
//! before the first real conversion.

use crate::translit;
use sheetport_sheet::{upsert, Table, UpsertOptions};

/// Outcome of a single subsystem probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Ok,
    Failed(String),
}

/// One line of the environment report
#[derive(Debug, Clone)]
pub struct ComponentStatus {
    pub component: &'static str,
    pub version: &'static str,
    pub status: ProbeStatus,
}

impl ComponentStatus {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ProbeStatus::Ok
    }
}

/// Probe every subsystem and return one status line per component
#[must_use]
pub fn environment_report() -> Vec<ComponentStatus> {
    let probes: [(&'static str, fn() -> Result<(), String>); 4] = [
        ("csv-codec", probe_csv),
        ("json-codec", probe_json),
        ("workbook", probe_workbook),
        ("transliteration", probe_translit),
    ];

    probes
        .into_iter()
        .map(|(component, probe)| {
            let status = match probe() {
                Ok(()) => {
                    tracing::info!("doctor: {component} ok");
                    ProbeStatus::Ok
                }
                Err(detail) => {
                    tracing::error!("doctor: {component} failed: {detail}");
                    ProbeStatus::Failed(detail)
                }
            };
            ComponentStatus {
                component,
                version: env!("CARGO_PKG_VERSION"),
                status,
            }
        })
        .collect()
}

fn probe_csv() -> Result<(), String> {
    let table = Table::from_csv_str("a,b\n1,2\n").map_err(|e| e.to_string())?;
    let restored = Table::from_csv_str(&table.to_csv_string()).map_err(|e| e.to_string())?;
    if restored == table {
        Ok(())
    } else {
        Err("round trip changed the table".to_string())
    }
}

fn probe_json() -> Result<(), String> {
    let table = Table::from_records_str(r#"[{"a": 1}]"#).map_err(|e| e.to_string())?;
    let json = table.to_records_string().map_err(|e| e.to_string())?;
    let restored = Table::from_records_str(&json).map_err(|e| e.to_string())?;
    if restored == table {
        Ok(())
    } else {
        Err("round trip changed the table".to_string())
    }
}

fn probe_workbook() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
    let path = dir.path().join("probe.xlsx");

    let table =
        Table::from_rows(vec!["probe"], vec![vec!["ok"]]).map_err(|e| e.to_string())?;
    upsert(&path, "Probe", &table, &UpsertOptions::default()).map_err(|e| e.to_string())?;

    let restored = Table::from_xlsx_sheet(&path, "Probe").map_err(|e| e.to_string())?;
    if restored == table {
        Ok(())
    } else {
        Err("workbook read back different data".to_string())
    }
}

fn probe_translit() -> Result<(), String> {
    let result = translit::to_pinyin("你好");
    if result == "NiHao" {
        Ok(())
    } else {
        Err(format!("expected 'NiHao', got '{result}'"))
    }
}
