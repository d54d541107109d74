use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::{self, File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::sheet::SheetData;

/// Failures raised by a row store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named sheet does not exist in the backend.
    #[error("sheet '{0}' does not exist")]
    SheetMissing(String),

    /// A row position handle no longer addresses a data row. Happens when
    /// the sheet was structurally edited between locate and write.
    #[error("row {index} is out of range for sheet '{sheet}'")]
    RowOutOfRange { sheet: String, index: usize },

    /// The backing file could not be read or written.
    #[error("sheet backend I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold valid sheet data.
    #[error("sheet backend returned invalid data: {0}")]
    Data(#[from] serde_json::Error),
}

/// The row-range read/write/append/delete capability the proxy is built
/// against. Row positions are 1-indexed offsets from the header row, the
/// same handle the upstream range addresses use.
///
/// Implementations make no atomicity promise across calls: a position
/// obtained from `fetch` can be stale by the time `overwrite_row` or
/// `delete_row` runs. The proxy does not paper over that.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Fetch the full rectangular range of a sheet, header row included.
    async fn fetch(&self, sheet: &str) -> Result<SheetData, StoreError>;

    /// Append one data row at the end of the sheet.
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<(), StoreError>;

    /// Overwrite the full width of the data row at `index`.
    async fn overwrite_row(
        &self,
        sheet: &str,
        index: usize,
        row: Vec<String>,
    ) -> Result<(), StoreError>;

    /// Remove the data row at `index`, shifting subsequent rows up.
    async fn delete_row(&self, sheet: &str, index: usize) -> Result<(), StoreError>;
}

type SheetMap = HashMap<String, SheetData>;

fn sheet_mut<'a>(sheets: &'a mut SheetMap, sheet: &str) -> Result<&'a mut SheetData, StoreError> {
    sheets
        .get_mut(sheet)
        .ok_or_else(|| StoreError::SheetMissing(sheet.to_string()))
}

fn check_index(data: &SheetData, sheet: &str, index: usize) -> Result<usize, StoreError> {
    if index >= 1 && index <= data.rows.len() {
        Ok(index - 1)
    } else {
        Err(StoreError::RowOutOfRange {
            sheet: sheet.to_string(),
            index,
        })
    }
}

/// In-process row store. Tests substitute this for the file-backed store.
#[derive(Default)]
pub struct MemoryStore {
    sheets: Mutex<SheetMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet, replacing any previous contents under the same name.
    pub fn insert_sheet(&self, name: &str, data: SheetData) {
        self.sheets.lock().unwrap().insert(name.to_string(), data);
    }

    /// Snapshot a sheet for assertions.
    pub fn sheet(&self, name: &str) -> Option<SheetData> {
        self.sheets.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn fetch(&self, sheet: &str) -> Result<SheetData, StoreError> {
        let sheets = self.sheets.lock().unwrap();
        sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::SheetMissing(sheet.to_string()))
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<(), StoreError> {
        let mut sheets = self.sheets.lock().unwrap();
        sheet_mut(&mut sheets, sheet)?.rows.push(row);
        Ok(())
    }

    async fn overwrite_row(
        &self,
        sheet: &str,
        index: usize,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        let mut sheets = self.sheets.lock().unwrap();
        let data = sheet_mut(&mut sheets, sheet)?;
        let at = check_index(data, sheet, index)?;
        data.rows[at] = row;
        Ok(())
    }

    async fn delete_row(&self, sheet: &str, index: usize) -> Result<(), StoreError> {
        let mut sheets = self.sheets.lock().unwrap();
        let data = sheet_mut(&mut sheets, sheet)?;
        let at = check_index(data, sheet, index)?;
        data.rows.remove(at);
        Ok(())
    }
}

/// JSON-file-backed row store. One file holds every sheet as
/// `{"<name>": {"headers": [...], "rows": [[...]]}}`.
///
/// The file is re-read on every fetch and rewritten on every mutation;
/// there is no cached representation and no transaction spanning calls,
/// the same fetch-per-request behavior a remote range backend shows.
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write of the backing file within the process.
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    /// Create the backing file (and its parent directory) with an empty
    /// sheet map if it does not exist yet. Called once at startup.
    pub fn init(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent)?;
            }
        }
        if !self.path.exists() {
            let mut file = File::create(&self.path)?;
            file.write_all(b"{}")?;
        }
        Ok(())
    }

    fn load(&self) -> Result<SheetMap, StoreError> {
        if !Path::new(&self.path).exists() {
            return Ok(SheetMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, sheets: &SheetMap) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(sheets)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn mutate(
        &self,
        apply: impl FnOnce(&mut SheetMap) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().unwrap();
        let mut sheets = self.load()?;
        apply(&mut sheets)?;
        self.save(&sheets)
    }
}

#[async_trait]
impl RowStore for JsonFileStore {
    async fn fetch(&self, sheet: &str) -> Result<SheetData, StoreError> {
        let _guard = self.io_lock.lock().unwrap();
        let mut sheets = self.load()?;
        sheets
            .remove(sheet)
            .ok_or_else(|| StoreError::SheetMissing(sheet.to_string()))
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<(), StoreError> {
        self.mutate(|sheets| {
            sheet_mut(sheets, sheet)?.rows.push(row);
            Ok(())
        })
    }

    async fn overwrite_row(
        &self,
        sheet: &str,
        index: usize,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        self.mutate(|sheets| {
            let data = sheet_mut(sheets, sheet)?;
            let at = check_index(data, sheet, index)?;
            data.rows[at] = row;
            Ok(())
        })
    }

    async fn delete_row(&self, sheet: &str, index: usize) -> Result<(), StoreError> {
        self.mutate(|sheets| {
            let data = sheet_mut(sheets, sheet)?;
            let at = check_index(data, sheet, index)?;
            data.rows.remove(at);
            Ok(())
        })
    }
}
