use std::sync::Arc;

use crate::error::ApiError;
use crate::sheet::{Record, SheetData, value_to_cell};
use crate::store::RowStore;

/// Maps row-oriented CRUD operations onto a sheet-shaped data source.
///
/// Every operation fetches the full sheet first; update and delete then
/// write by the 1-indexed position found in that snapshot. Nothing locks
/// the read-then-write sequence, so two concurrent updates against the
/// same sheet can both locate a row before either writes. Known hazard,
/// left as-is.
#[derive(Clone)]
pub struct TabularProxy {
    store: Arc<dyn RowStore>,
}

impl TabularProxy {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        TabularProxy { store }
    }

    /// The underlying row store, for collaborators that read sheets the
    /// proxy does not mediate (the credential check).
    pub fn store(&self) -> &dyn RowStore {
        self.store.as_ref()
    }

    async fn fetch(&self, sheet: &str) -> Result<SheetData, ApiError> {
        let data = self.store.fetch(sheet).await?;
        if data.headers.is_empty() {
            // Record operations are meaningless without a header row.
            return Err(ApiError::Upstream(format!(
                "hoja '{sheet}' no tiene fila de encabezados"
            )));
        }
        Ok(data)
    }

    /// All records of a sheet, one per data row, in sheet order.
    pub async fn list(&self, sheet: &str) -> Result<Vec<Record>, ApiError> {
        Ok(self.fetch(sheet).await?.records())
    }

    /// First record whose identifier column equals `id`.
    pub async fn get(&self, sheet: &str, id: &str) -> Result<Record, ApiError> {
        let data = self.fetch(sheet).await?;
        data.find_row(id)
            .map(|(_, row)| data.to_record(row))
            .ok_or_else(|| not_found(sheet, id))
    }

    /// Append a new record. When the caller supplies no identifier the
    /// next numeric one is assigned. Returns the identifier actually
    /// written.
    pub async fn create(&self, sheet: &str, fields: &Record) -> Result<String, ApiError> {
        if fields.is_empty() {
            return Err(ApiError::Validation(
                "el cuerpo debe contener al menos un campo".to_string(),
            ));
        }

        let data = self.fetch(sheet).await?;
        let id_col = data.id_column();
        let id_header = &data.headers[id_col];

        let supplied = fields
            .get(id_header)
            .map(value_to_cell)
            .filter(|id| !id.is_empty());
        let id = supplied.unwrap_or_else(|| data.next_id());

        let mut row = data.project(fields);
        row[id_col] = id.clone();
        self.store.append_row(sheet, row).await?;
        Ok(id)
    }

    /// Full overwrite of the record with identifier `id`: fields not
    /// supplied reset to the empty string. The identifier column is
    /// written from the path id, never from the body.
    pub async fn update(&self, sheet: &str, id: &str, fields: &Record) -> Result<(), ApiError> {
        let data = self.fetch(sheet).await?;
        let (index, _) = data.find_row(id).ok_or_else(|| not_found(sheet, id))?;

        let id_col = data.id_column();
        let mut row = data.project(fields);
        row[id_col] = id.to_string();
        self.store.overwrite_row(sheet, index, row).await?;
        Ok(())
    }

    /// Remove the record with identifier `id`, shifting later rows up.
    pub async fn delete(&self, sheet: &str, id: &str) -> Result<(), ApiError> {
        let data = self.fetch(sheet).await?;
        let (index, _) = data.find_row(id).ok_or_else(|| not_found(sheet, id))?;
        self.store.delete_row(sheet, index).await?;
        Ok(())
    }
}

fn not_found(sheet: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("no existe registro '{id}' en la hoja '{sheet}'"))
}
