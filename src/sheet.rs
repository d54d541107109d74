use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record materialized from one data row: header name -> cell value.
/// Field order follows header order (serde_json is built with
/// `preserve_order`).
pub type Record = Map<String, Value>;

/// A named rectangular range, schema-by-first-row made explicit: `headers`
/// is the header row, `rows` are the data rows below it.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        SheetData { headers, rows }
    }

    /// Index of the identifier column: the header literally named `ID`,
    /// or column 0 when no such header exists.
    pub fn id_column(&self) -> usize {
        self.headers.iter().position(|h| h == "ID").unwrap_or(0)
    }

    /// Materialize one data row into a record by positional zip with the
    /// headers. Cells beyond the row's width become empty strings.
    pub fn to_record(&self, row: &[String]) -> Record {
        let mut record = Record::new();
        for (i, header) in self.headers.iter().enumerate() {
            let cell = row.get(i).cloned().unwrap_or_default();
            record.insert(header.clone(), Value::String(cell));
        }
        record
    }

    /// Materialize every data row, in sheet order.
    pub fn records(&self) -> Vec<Record> {
        self.rows.iter().map(|row| self.to_record(row)).collect()
    }

    /// Project a field map onto header order, producing a full-width row.
    /// Fields not present in the map become empty strings.
    pub fn project(&self, fields: &Record) -> Vec<String> {
        self.headers
            .iter()
            .map(|header| fields.get(header).map(value_to_cell).unwrap_or_default())
            .collect()
    }

    /// Find the first data row whose identifier column equals `id`.
    /// Returns the 1-indexed row position (offset from the header row),
    /// the handle used for overwrite and delete.
    pub fn find_row(&self, id: &str) -> Option<(usize, &Vec<String>)> {
        let id_col = self.id_column();
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.get(id_col).map(String::as_str) == Some(id))
            .map(|(i, row)| (i + 1, row))
    }

    /// Next auto-assigned identifier: `max(existing numeric ids) + 1`.
    /// Non-numeric and missing ids are ignored; when none are numeric the
    /// first identifier is `1`.
    pub fn next_id(&self) -> String {
        let id_col = self.id_column();
        self.rows
            .iter()
            .filter_map(|row| row.get(id_col))
            .filter_map(|cell| cell.trim().parse::<i64>().ok())
            .max()
            .map_or_else(|| "1".to_string(), |max| (max + 1).to_string())
    }
}

/// Flatten a JSON value into the cell text stored upstream. Strings pass
/// through unquoted, null becomes the empty cell, anything else keeps its
/// JSON rendering.
pub(crate) fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
