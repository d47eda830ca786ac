//! Winners export
//!
//! Serialises a ledger snapshot as a two-column table: `Draw Order`
//! (1-based) and `Winner Name`. Workbooks hold a single "Winners" sheet.

use std::fs;
use std::path::Path;

use rf_core::Participant;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};

use crate::{FileError, FileResult};

/// Default export file name
pub const DEFAULT_EXPORT_NAME: &str = "raffle-winners.xlsx";

/// Worksheet name in exported workbooks
pub const WINNERS_SHEET: &str = "Winners";

pub const DRAW_ORDER_HEADER: &str = "Draw Order";
pub const WINNER_NAME_HEADER: &str = "Winner Name";

/// One exported ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    #[serde(rename = "Draw Order")]
    pub draw_order: usize,
    #[serde(rename = "Winner Name")]
    pub winner_name: String,
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    /// Infer from file extension
    pub fn from_path(path: &Path) -> FileResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(FileError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Ledger snapshot as numbered records, in draw order
pub fn winner_records(winners: &[Participant]) -> Vec<WinnerRecord> {
    winners
        .iter()
        .enumerate()
        .map(|(i, w)| WinnerRecord {
            draw_order: i + 1,
            winner_name: w.name().to_string(),
        })
        .collect()
}

pub fn to_csv(winners: &[Participant]) -> String {
    let mut out = format!("{},{}\n", DRAW_ORDER_HEADER, WINNER_NAME_HEADER);
    for record in winner_records(winners) {
        out.push_str(&record.draw_order.to_string());
        out.push(',');
        out.push_str(&csv_field(&record.winner_name));
        out.push('\n');
    }
    out
}

pub fn to_json(winners: &[Participant]) -> FileResult<String> {
    Ok(serde_json::to_string_pretty(&winner_records(winners))?)
}

/// Single-sheet workbook with a header row
pub fn write_xlsx(winners: &[Participant], path: &Path) -> FileResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(WINNERS_SHEET)?;
    sheet.write_string(0, 0, DRAW_ORDER_HEADER)?;
    sheet.write_string(0, 1, WINNER_NAME_HEADER)?;

    for (row, record) in (1u32..).zip(winner_records(winners)) {
        sheet.write_number(row, 0, record.draw_order as f64)?;
        sheet.write_string(row, 1, record.winner_name)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Quote a field containing a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write the winners to `path`; format follows the extension
pub fn export_winners(winners: &[Participant], path: impl AsRef<Path>) -> FileResult<()> {
    let path = path.as_ref();
    if winners.is_empty() {
        return Err(FileError::EmptyExport);
    }

    match ExportFormat::from_path(path)? {
        ExportFormat::Xlsx => write_xlsx(winners, path)?,
        ExportFormat::Csv => fs::write(path, to_csv(winners))?,
        ExportFormat::Json => fs::write(path, to_json(winners)?)?,
    }

    log::info!(
        "[Export] Wrote {} winners to {}",
        winners.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winners(list: &[&str]) -> Vec<Participant> {
        list.iter().map(|&n| Participant::from(n)).collect()
    }

    #[test]
    fn test_records_are_one_based() {
        let records = winner_records(&winners(&["Cy", "Ann"]));
        assert_eq!(records[0].draw_order, 1);
        assert_eq!(records[0].winner_name, "Cy");
        assert_eq!(records[1].draw_order, 2);
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&winners(&["Cy", "Doe, Jane", "Say \"Hi\""]));
        assert_eq!(
            csv,
            "Draw Order,Winner Name\n1,Cy\n2,\"Doe, Jane\"\n3,\"Say \"\"Hi\"\"\"\n"
        );
    }

    #[test]
    fn test_json_headers() {
        let json = to_json(&winners(&["Ann"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["Draw Order"], 1);
        assert_eq!(value[0]["Winner Name"], "Ann");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");
        export_winners(&winners(&["Bo", "Ann"]), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Draw Order,Winner Name\n1,Bo\n"));
    }

    #[test]
    fn test_export_xlsx_winners_sheet() {
        use calamine::{Reader, open_workbook_auto};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_NAME);
        export_winners(&winners(&["Cy", "Ann"]), &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![WINNERS_SHEET.to_string()]);

        let range = workbook.worksheet_range(WINNERS_SHEET).unwrap();
        let cell = |row: u32, col: u32| range.get_value((row, col)).map(|c| c.to_string());
        assert_eq!(cell(0, 0).as_deref(), Some(DRAW_ORDER_HEADER));
        assert_eq!(cell(0, 1).as_deref(), Some(WINNER_NAME_HEADER));
        assert_eq!(cell(1, 0).as_deref(), Some("1"));
        assert_eq!(cell(1, 1).as_deref(), Some("Cy"));
        assert_eq!(cell(2, 0).as_deref(), Some("2"));
        assert_eq!(cell(2, 1).as_deref(), Some("Ann"));
        assert_eq!(range.height(), 3);
    }

    #[test]
    fn test_export_empty_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");
        assert!(matches!(
            export_winners(&[], &path),
            Err(FileError::EmptyExport)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.pdf");
        assert!(matches!(
            export_winners(&winners(&["Ann"]), &path),
            Err(FileError::UnsupportedFormat(_))
        ));
    }
}
