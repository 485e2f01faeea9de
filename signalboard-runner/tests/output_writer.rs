//! Integration tests for the `entrada.json` document writer.

use chrono::TimeZone;
use serde_json::Value;
use std::fs;

use signalboard_core::domain::{Instrument, Mode, SignalRecord, SignalSide};
use signalboard_runner::{write_document, BatchOutcome, EntryDocument, OutputError};

fn record(base: &str, side: SignalSide) -> SignalRecord {
    SignalRecord {
        instrument: Instrument::new(base, "USDT"),
        mode: Mode::Positional,
        side,
        price: 64_250.5,
        target: 67_100.0,
        gain_pct: 4.44,
        confidence_pct: 61.54,
        date: "2026-10-18".into(),
        time: "09:30".into(),
    }
}

fn outcome() -> BatchOutcome {
    let offset = chrono::FixedOffset::west_opt(3 * 3_600).unwrap();
    BatchOutcome {
        records: vec![
            record("BTC", SignalSide::Long),
            SignalRecord::no_data(
                Instrument::new("XEM", "USDT"),
                "2026-10-18".into(),
                "09:31".into(),
            ),
        ],
        total_instruments: 3,
        cancelled: true,
        finished_at: offset.with_ymd_and_hms(2026, 10, 18, 9, 31, 7).unwrap(),
    }
}

#[test]
fn document_has_the_dashboard_shape() {
    let doc = EntryDocument::from_outcome(&outcome());
    let json: Value = serde_json::to_value(&doc).unwrap();

    assert_eq!(json["swing"], Value::Array(vec![]));
    assert_eq!(json["total_moedas"], 3);
    assert_eq!(json["total_processadas"], 2);
    assert_eq!(json["ultima_atualizacao"], "2026-10-18T09:31:07-03:00");

    let entry = &json["posicional"][0];
    let mut keys: Vec<&str> = entry.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["alvo", "assert_pct", "data", "ganho_pct", "hora", "modo", "par", "preco", "sinal"]
    );
    assert_eq!(entry["par"], "BTC");
    assert_eq!(entry["modo"], "POSICIONAL");
    assert_eq!(entry["sinal"], "LONG");
    assert_eq!(entry["preco"], 64_250.5);

    let degraded = &json["posicional"][1];
    assert_eq!(degraded["sinal"], "SEM_DADOS");
    assert_eq!(degraded["assert_pct"], 55.0);
    assert_eq!(degraded["alvo"], 0.0);
}

#[test]
fn write_creates_parent_dirs_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("entrada.json");
    let doc = EntryDocument::from_outcome(&outcome());

    write_document(&doc, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let back: EntryDocument = serde_json::from_str(&text).unwrap();
    assert_eq!(back, doc);
    assert!(!dir.path().join("data").join("entrada.json.tmp").exists());
}

#[test]
fn write_replaces_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entrada.json");
    fs::write(&path, "stale").unwrap();

    let mut doc = EntryDocument::from_outcome(&outcome());
    doc.posicional.truncate(1);
    write_document(&doc, &path).unwrap();

    let back: EntryDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back.posicional.len(), 1);
    assert_eq!(back.posicional[0].side, SignalSide::Long);
}

#[test]
fn failed_rename_reports_write_failure_and_cleans_up() {
    // The target is a directory, so the final rename must fail.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entrada.json");
    fs::create_dir(&path).unwrap();

    let err = write_document(&EntryDocument::from_outcome(&outcome()), &path).unwrap_err();

    let OutputError::WriteFailure { path: failed, .. } = err;
    assert_eq!(failed, path);
    assert!(!dir.path().join("entrada.json.tmp").exists());
    assert!(path.is_dir());
}
