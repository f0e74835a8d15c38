use serde_json::{json, Value};

use super::GoogleWorkspace;
use crate::error::Result;

const DOCUMENTS_URL: &str = "https://docs.googleapis.com/v1/documents";

async fn batch_update(ws: &GoogleWorkspace, document_id: &str, requests: Value) -> Result<()> {
    let req = ws
        .http
        .post(format!("{}/{}:batchUpdate", DOCUMENTS_URL, document_id))
        .json(&json!({ "requests": requests }));
    let _: Value = ws.send("docs", req).await?;
    Ok(())
}

pub async fn replace_all_text(
    ws: &GoogleWorkspace,
    document_id: &str,
    placeholder: &str,
    text: &str,
) -> Result<()> {
    batch_update(ws, document_id, replace_request(placeholder, text)).await
}

pub async fn insert_text(ws: &GoogleWorkspace, document_id: &str, index: usize, text: &str) -> Result<()> {
    batch_update(ws, document_id, insert_request(index, text)).await
}

fn replace_request(placeholder: &str, text: &str) -> Value {
    json!([{
        "replaceAllText": {
            "containsText": { "text": placeholder, "matchCase": true },
            "replaceText": text,
        }
    }])
}

fn insert_request(index: usize, text: &str) -> Value {
    json!([{
        "insertText": {
            "location": { "index": index },
            "text": text,
        }
    }])
}
