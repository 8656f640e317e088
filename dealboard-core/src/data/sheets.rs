//! Google Sheets table source.
//!
//! Reads worksheets through the Sheets v4 values API with a blocking HTTP
//! client. HTTP 429 maps to the distinguished `RateLimited` error; every
//! other failure aborts the fetch attempt without retry.

use std::time::Duration;

use serde::Deserialize;

use super::source::{Row, SourceError, TableSource};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Environment variable holding the opaque bearer token for the Sheets API.
pub const TOKEN_ENV_VAR: &str = "DEALBOARD_SHEETS_TOKEN";

/// Opaque credential for the Sheets API.
///
/// How the token is minted (service account, OAuth flow) is somebody else's
/// problem; the core only requires that one exists before any fetch starts.
#[derive(Clone)]
pub struct SheetsAuth {
    token: String,
}

impl SheetsAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Read the token from the environment. A missing or empty variable is
    /// fatal at startup — callers must not attempt a fetch without it.
    pub fn from_env() -> Result<Self, SourceError> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.trim().is_empty() => Ok(Self::new(token)),
            _ => Err(SourceError::MissingCredentials(format!(
                "set {TOKEN_ENV_VAR} to a Sheets API bearer token"
            ))),
        }
    }
}

/// Sheets v4 `values.get` response.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Google Sheets table source for one spreadsheet.
pub struct SheetsSource {
    client: reqwest::blocking::Client,
    auth: SheetsAuth,
    spreadsheet_key: String,
}

impl SheetsSource {
    pub fn new(auth: SheetsAuth, spreadsheet_key: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            auth,
            spreadsheet_key: spreadsheet_key.into(),
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!("{SHEETS_API_BASE}/{}/values/{range}", self.spreadsheet_key)
    }

    /// One values.get call, with status codes mapped into the error taxonomy.
    fn get_values(&self, worksheet: &str, range: &str) -> Result<ValuesResponse, SourceError> {
        let reference = if range.is_empty() {
            worksheet.to_string()
        } else {
            format!("{worksheet}!{range}")
        };
        let url = self.values_url(&reference);
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.auth.token)
            .send()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::WorksheetNotFound {
                name: worksheet.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
            });
        }

        resp.json()
            .map_err(|e| SourceError::BadResponse(format!("values response for {reference}: {e}")))
    }
}

impl TableSource for SheetsSource {
    fn name(&self) -> &str {
        "google_sheets"
    }

    fn worksheet(&self, name: &str) -> Result<Vec<Row>, SourceError> {
        let resp = self.get_values(name, "")?;
        Ok(records_from_values(&resp.values))
    }

    fn rows_in_range(
        &self,
        name: &str,
        range: &str,
        headers: &[&str],
    ) -> Result<Vec<Row>, SourceError> {
        let resp = self.get_values(name, range)?;
        Ok(rows_with_headers(&resp.values, headers))
    }
}

/// Render a cell to text. The API returns strings for formatted reads, but
/// numeric cells can come back as JSON numbers.
fn cell_text(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Build header-keyed records from a values grid: first row is the header,
/// ragged data rows are padded with empty cells.
fn records_from_values(values: &[Vec<serde_json::Value>]) -> Vec<Row> {
    let Some((header, data)) = values.split_first() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();

    data.iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), row.get(i).map(cell_text).unwrap_or_default()))
                .collect()
        })
        .collect()
}

/// Build records from a headerless cell window using the supplied names.
fn rows_with_headers(values: &[Vec<serde_json::Value>], headers: &[&str]) -> Vec<Row> {
    values
        .iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.to_string(), row.get(i).map(cell_text).unwrap_or_default()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_use_header_row_for_field_names() {
        let values = vec![
            vec![json!("Deal Name"), json!("Deal owner")],
            vec![json!("A社 基幹システム"), json!("101")],
        ];
        let rows = records_from_values(&values);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Deal Name"], "A社 基幹システム");
        assert_eq!(rows[0]["Deal owner"], "101");
    }

    #[test]
    fn ragged_rows_are_padded() {
        let values = vec![
            vec![json!("Deal Name"), json!("Deal owner"), json!("受注金額")],
            vec![json!("B社")],
        ];
        let rows = records_from_values(&values);
        assert_eq!(rows[0]["Deal owner"], "");
        assert_eq!(rows[0]["受注金額"], "");
    }

    #[test]
    fn numeric_cells_become_text() {
        let values = vec![vec![json!("受注金額")], vec![json!(1500)]];
        let rows = records_from_values(&values);
        assert_eq!(rows[0]["受注金額"], "1500");
    }

    #[test]
    fn empty_grid_has_no_records() {
        assert!(records_from_values(&[]).is_empty());
    }

    #[test]
    fn window_rows_use_supplied_headers() {
        let values = vec![
            vec![json!("1"), json!("アポ取得")],
            vec![json!("2"), json!("初回商談")],
        ];
        let rows = rows_with_headers(&values, &["Stage ID", "Stage Name"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Stage ID"], "2");
        assert_eq!(rows[1]["Stage Name"], "初回商談");
    }

    #[test]
    fn missing_token_is_missing_credentials() {
        std::env::remove_var(TOKEN_ENV_VAR);
        assert!(matches!(
            SheetsAuth::from_env(),
            Err(SourceError::MissingCredentials(_))
        ));
    }
}
