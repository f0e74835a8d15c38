use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::GoogleWorkspace;
use crate::error::Result;

const SPREADSHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Created {
    spreadsheet_id: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub async fn create(ws: &GoogleWorkspace, title: &str) -> Result<String> {
    let req = ws
        .http
        .post(SPREADSHEETS_URL)
        .query(&[("fields", "spreadsheetId")])
        .json(&json!({ "properties": { "title": title } }));
    let created: Created = ws.send("sheets", req).await?;
    info!(spreadsheet = %created.spreadsheet_id, title, "created spreadsheet");
    Ok(created.spreadsheet_id)
}

pub async fn update_values(
    ws: &GoogleWorkspace,
    spreadsheet_id: &str,
    range: &str,
    values: &[Vec<String>],
) -> Result<()> {
    let req = ws
        .http
        .put(format!("{}/{}/values/{}", SPREADSHEETS_URL, spreadsheet_id, range))
        .query(&[("valueInputOption", "RAW")])
        .json(&json!({ "values": values }));
    let _: Value = ws.send("sheets", req).await?;
    info!(spreadsheet = spreadsheet_id, rows = values.len(), "uploaded values");
    Ok(())
}

pub async fn get_values(ws: &GoogleWorkspace, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
    let req = ws
        .http
        .get(format!("{}/{}/values/{}", SPREADSHEETS_URL, spreadsheet_id, range));
    let body: ValueRange = ws.send("sheets", req).await?;
    Ok(stringify(body.values))
}

/// Sheets returns typed cells; the outline only deals in text.
fn stringify(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}
