//! Roster import
//!
//! Names arrive as pasted text (one per line), as spreadsheet workbooks or
//! as files exported from a spreadsheet. Only the first column is read; a
//! "Participant Names" header row is skipped.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use rf_core::{Participant, Roster};

use crate::{FileError, FileResult};

/// Header cell skipped on import (compared case-insensitively)
pub const HEADER_LABEL: &str = "participant names";

/// Column separators recognised in spreadsheet exports
const SEPARATORS: [char; 3] = [',', ';', '\t'];

/// Parse names from text.
///
/// Empty lines and the header row are dropped. Quoted first cells
/// (`"Doe, Jane",42`) keep their embedded separators.
pub fn parse_names(text: &str) -> Vec<Participant> {
    text.lines()
        .filter_map(first_cell)
        .filter(|name| !name.eq_ignore_ascii_case(HEADER_LABEL))
        .filter_map(|name| Participant::new(name).ok())
        .collect()
}

fn first_cell(line: &str) -> Option<String> {
    let line = line.trim().trim_start_matches('\u{feff}');
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('"') {
        let mut cell = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    break;
                }
            } else {
                cell.push(c);
            }
        }
        return Some(cell.trim().to_string());
    }

    let cell = match line.find(SEPARATORS) {
        Some(idx) => &line[..idx],
        None => line,
    };
    Some(cell.trim().to_string())
}

/// Load a roster from a workbook (`.xlsx`, `.xls`, `.ods`) or a
/// `.txt`, `.csv` or `.tsv` file
pub fn load_roster(path: impl AsRef<Path>) -> FileResult<Roster> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FileError::NotFound(path.display().to_string()));
    }

    let names = match extension(path).as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_sheet_names(path)?,
        "txt" | "csv" | "tsv" | "" => {
            let text = String::from_utf8(fs::read(path)?).map_err(|_| {
                FileError::InvalidFile(format!("{} is not UTF-8 text", path.display()))
            })?;
            parse_names(&text)
        }
        other => return Err(FileError::UnsupportedFormat(other.to_string())),
    };

    log::info!("[Roster] Loaded {} names from {}", names.len(), path.display());
    Ok(Roster::new(names))
}

/// First column of the first worksheet. Non-text cells are skipped.
fn read_sheet_names(path: &Path) -> FileResult<Vec<Participant>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FileError::InvalidFile(format!("{} has no worksheets", path.display())))??;

    let names = range
        .rows()
        .filter_map(|row| match row.first() {
            Some(Data::String(cell)) => Some(cell.trim()),
            _ => None,
        })
        .filter(|name| !name.eq_ignore_ascii_case(HEADER_LABEL))
        .filter_map(|name| Participant::new(name).ok())
        .collect();
    Ok(names)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Accumulates names from several sources before a session starts
#[derive(Debug, Clone, Default)]
pub struct RosterBuilder {
    names: Vec<Participant>,
}

impl RosterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append names parsed from pasted text. Returns how many were added.
    pub fn add_text(&mut self, text: &str) -> usize {
        let parsed = parse_names(text);
        let added = parsed.len();
        self.names.extend(parsed);
        added
    }

    /// Append names from a file. Returns how many were added.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> FileResult<usize> {
        let roster = load_roster(path)?;
        let added = roster.len();
        self.names.extend(roster.iter().cloned());
        Ok(added)
    }

    pub fn add(&mut self, participant: Participant) {
        self.names.push(participant);
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[Participant] {
        &self.names
    }

    pub fn build(self) -> Roster {
        Roster::new(self.names)
    }
}
