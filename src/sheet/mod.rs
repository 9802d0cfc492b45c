pub mod google;
pub mod memory;

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::aggregate::PaperRecord;
use crate::error::{Error, Result};
use crate::profiles::NoteCategory;

/// A row as stored in the grid. Cells are typed: text, numbers and booleans
/// keep their JSON type so the spreadsheet can sort and compute on them.
pub type SheetRow = Vec<Value>;

pub const PAPER_NUMBER_COLUMN: &str = "paper_number";
pub const ABSENT_AVERAGE: &str = "N/A";

/// A read/write grid. Row indices are 0-based and include the header row.
pub trait SheetStore {
    fn read_all_rows(&self) -> Result<Vec<SheetRow>>;

    fn clear(&mut self) -> Result<()>;

    /// Insert `row` below the first `after` rows.
    fn append_row(&mut self, after: usize, row: &[Value]) -> Result<()>;

    fn update_row(&mut self, index: usize, row: &[Value]) -> Result<()>;

    fn append_rows(&mut self, after: usize, rows: &[SheetRow]) -> Result<()> {
        for (offset, row) in rows.iter().enumerate() {
            self.append_row(after + offset, row)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Wipe the sheet, then write header and every record.
    Initialize,
    /// Overwrite rows whose paper number is known, append the rest.
    Update,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub updated: usize,
    pub appended: usize,
}

/// Fixed column order for a given number of reviewer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    reviewer_slots: usize,
}

impl SheetLayout {
    pub fn new(reviewer_slots: usize) -> Self {
        Self { reviewer_slots }
    }

    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = [
            "paper_title",
            "withdrawn",
            PAPER_NUMBER_COLUMN,
            "paper_url",
            "num_reviewers",
            "avg_score",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        columns.extend((1..=self.reviewer_slots).map(|i| format!("reviewer{i}_score")));
        columns.push("avg_final_score".to_string());
        columns.extend((1..=self.reviewer_slots).map(|i| format!("reviewer{i}_final_score")));
        columns.extend(
            NoteCategory::ALL
                .iter()
                .map(|c| format!("{}_count", c.key())),
        );
        columns.push("others_count".to_string());
        columns.push("reviewer_participation".to_string());
        columns
    }

    pub fn header(&self) -> SheetRow {
        self.columns().into_iter().map(Value::String).collect()
    }

    pub fn paper_number_index(&self) -> usize {
        2
    }

    pub fn row(&self, record: &PaperRecord) -> SheetRow {
        let mut row = vec![
            Value::String(record.title.clone()),
            Value::Bool(record.withdrawn),
            json!(record.number),
            Value::String(record.url.clone()),
            json!(record.reviewer_count),
            average_cell(record.avg_initial),
        ];
        row.extend(self.slots(&record.initial_ratings));
        row.push(average_cell(record.avg_final));
        row.extend(self.slots(&record.final_ratings));
        row.extend(
            NoteCategory::ALL
                .iter()
                .map(|c| json!(record.counts.get(*c))),
        );
        row.push(json!(record.counts.others));
        row.push(json!(record.reviewer_participation));
        row
    }

    /// Absent ratings are written as empty strings; a null cell would leave
    /// the previous value in place on update.
    fn slots(&self, ratings: &[Option<f64>]) -> Vec<Value> {
        (0..self.reviewer_slots)
            .map(|i| {
                ratings
                    .get(i)
                    .copied()
                    .flatten()
                    .map_or_else(|| Value::String(String::new()), number_cell)
            })
            .collect()
    }
}

/// Round to two decimals; whole values become integers.
pub fn number_cell(value: f64) -> Value {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        json!(rounded as i64)
    } else {
        json!(rounded)
    }
}

/// `4.0` renders as `4`, anything else rounded to two decimals.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

fn average_cell(value: Option<f64>) -> Value {
    value.map_or_else(|| Value::String(ABSENT_AVERAGE.to_string()), number_cell)
}

/// How a cell reads on screen: booleans as `TRUE`/`FALSE`, numbers via
/// [`format_number`], null as empty.
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

pub fn row_text(row: &[Value]) -> Vec<String> {
    row.iter().map(cell_text).collect()
}

fn is_blank(row: &[Value]) -> bool {
    row.iter().all(|c| cell_text(c).trim().is_empty())
}

fn trimmed_header(row: &[Value]) -> Vec<String> {
    let mut cells = row_text(row);
    while cells.last().is_some_and(|c| c.trim().is_empty()) {
        cells.pop();
    }
    cells
}

/// Write `records` into `store`.
pub fn sync<S: SheetStore + ?Sized>(
    store: &mut S,
    layout: &SheetLayout,
    records: &[PaperRecord],
    mode: SyncMode,
) -> Result<SyncReport> {
    let existing = match mode {
        SyncMode::Initialize => {
            store.clear()?;
            info!("sheet cleared");
            Vec::new()
        }
        SyncMode::Update => {
            let mut rows = store.read_all_rows()?;
            while rows.last().is_some_and(|r| is_blank(r)) {
                rows.pop();
            }
            rows
        }
    };

    if existing.is_empty() {
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(layout.header());
        rows.extend(records.iter().map(|r| layout.row(r)));
        store.append_rows(0, &rows)?;
        info!(rows = records.len(), "wrote header and rows");
        return Ok(SyncReport {
            updated: 0,
            appended: records.len(),
        });
    }

    let expected = layout.columns();
    let found = trimmed_header(&existing[0]);
    if found != expected {
        return Err(Error::SchemaMismatch {
            expected: expected.join(", "),
            found: found.join(", "),
        });
    }

    let number_col = layout.paper_number_index();
    let mut index: HashMap<u64, usize> = HashMap::new();
    for (position, row) in existing.iter().enumerate().skip(1) {
        let cell = row.get(number_col).map(cell_text).unwrap_or_default();
        let cell = cell.trim();
        match cell.parse::<u64>() {
            Ok(number) => {
                index.entry(number).or_insert(position);
            }
            Err(_) if cell.is_empty() => {}
            Err(_) => warn!(row = position + 1, cell, "unreadable paper number, row left alone"),
        }
    }

    let mut report = SyncReport::default();
    let mut appended: Vec<SheetRow> = Vec::new();
    let mut next_position = existing.len();
    for record in records {
        let row = layout.row(record);
        match index.get(&record.number) {
            Some(&position) if position < existing.len() => {
                store.update_row(position, &row)?;
                report.updated += 1;
            }
            Some(&position) => {
                // Appeared earlier in this batch; replace the pending row.
                appended[position - existing.len()] = row;
            }
            None => {
                index.insert(record.number, next_position);
                next_position += 1;
                appended.push(row);
            }
        }
    }
    report.appended = appended.len();
    // Below the last non-blank row, even when blank rows sit in between.
    store.append_rows(existing.len(), &appended)?;

    info!(
        updated = report.updated,
        appended = report.appended,
        "sheet updated"
    );
    Ok(report)
}
