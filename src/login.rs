use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::sheet::Record;
use crate::store::{RowStore, StoreError};

/// Credential data received from the login form.
///
/// Wire names are Spanish (`usuario` = username, `clave` = password).
/// Both default to the empty string so a
/// missing field is reported as a validation error rather than a
/// deserialization rejection.
#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    /// Username to check.
    #[serde(default)]
    pub usuario: String,

    /// Password in plaintext (only transmitted, compared verbatim).
    #[serde(default)]
    pub clave: String,
}

/// Name of the column holding usernames in the credential sheet.
const USER_COLUMN: &str = "usuario";
/// Name of the column holding passwords in the credential sheet.
const PASSWORD_COLUMN: &str = "clave";

/// Verify credentials against the credential sheet.
///
/// The comparison is exact plaintext string equality on both the
/// `usuario` and `clave` columns. There is no hashing; the credential
/// table stores passwords in clear.
///
/// # Arguments
/// * `store` - Row store holding the credential sheet
/// * `sheet` - Name of the credential sheet
/// * `credentials` - Username and password to check
///
/// # Returns
/// * `Ok(Some(record))` - Credentials match; the full user record is echoed
/// * `Ok(None)` - No row matches both fields
///
/// # Errors
/// * `ApiError::Upstream` if the credential sheet cannot be read
pub async fn verify(
    store: &dyn RowStore,
    sheet: &str,
    credentials: &Credentials,
) -> Result<Option<Record>, ApiError> {
    let data = match store.fetch(sheet).await {
        Ok(data) => data,
        // A missing credential table is a server-side fault, not a 404.
        Err(StoreError::SheetMissing(name)) => {
            return Err(ApiError::Upstream(format!(
                "hoja de credenciales '{name}' no disponible"
            )));
        }
        Err(other) => return Err(other.into()),
    };

    let user_col = data.headers.iter().position(|h| h == USER_COLUMN);
    let pass_col = data.headers.iter().position(|h| h == PASSWORD_COLUMN);
    let (Some(user_col), Some(pass_col)) = (user_col, pass_col) else {
        return Err(ApiError::Upstream(format!(
            "hoja de credenciales '{sheet}' sin columnas '{USER_COLUMN}'/'{PASSWORD_COLUMN}'"
        )));
    };

    let matched = data.rows.iter().find(|row| {
        row.get(user_col).map(String::as_str) == Some(credentials.usuario.as_str())
            && row.get(pass_col).map(String::as_str) == Some(credentials.clave.as_str())
    });

    Ok(matched.map(|row| data.to_record(row)))
}
