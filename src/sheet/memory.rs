use serde_json::Value;

use crate::error::{Error, Result};

use super::{SheetRow, SheetStore};

/// Grid held in memory. Backs `--dry-run` and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    rows: Vec<SheetRow>,
}

impl MemorySheet {
    pub fn with_rows(rows: Vec<SheetRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }
}

impl SheetStore for MemorySheet {
    fn read_all_rows(&self) -> Result<Vec<SheetRow>> {
        Ok(self.rows.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }

    fn append_row(&mut self, after: usize, row: &[Value]) -> Result<()> {
        let at = after.min(self.rows.len());
        self.rows.insert(at, row.to_vec());
        Ok(())
    }

    fn update_row(&mut self, index: usize, row: &[Value]) -> Result<()> {
        let slot = self
            .rows
            .get_mut(index)
            .ok_or_else(|| Error::Sheet(format!("row {index} is out of range")))?;
        *slot = row.to_vec();
        Ok(())
    }
}
