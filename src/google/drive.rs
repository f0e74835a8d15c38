use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::GoogleWorkspace;
use crate::error::Result;

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DOCUMENT_MIME: &str = "application/vnd.google-apps.document";

#[derive(Deserialize)]
struct FileRef {
    id: String,
}

pub async fn copy_file(ws: &GoogleWorkspace, file_id: &str, name: &str) -> Result<String> {
    let req = ws
        .http
        .post(format!("{}/{}/copy", FILES_URL, file_id))
        .query(&[("fields", "id")])
        .json(&json!({ "name": name }));
    let file: FileRef = ws.send("drive", req).await?;
    info!(template = file_id, copy = %file.id, "copied file");
    Ok(file.id)
}

pub async fn create_document(ws: &GoogleWorkspace, name: &str) -> Result<String> {
    let req = ws
        .http
        .post(FILES_URL)
        .query(&[("fields", "id")])
        .json(&json!({ "name": name, "mimeType": DOCUMENT_MIME }));
    let file: FileRef = ws.send("drive", req).await?;
    info!(document = %file.id, name, "created document");
    Ok(file.id)
}

pub async fn share_with_domain(
    ws: &GoogleWorkspace,
    file_id: &str,
    domain: &str,
    discoverable: bool,
) -> Result<()> {
    let req = ws
        .http
        .post(format!("{}/{}/permissions", FILES_URL, file_id))
        .query(&[("fields", "id")])
        .json(&json!({
            "type": "domain",
            "role": "writer",
            "domain": domain,
            "allowFileDiscovery": discoverable,
        }));
    let _: serde_json::Value = ws.send("drive", req).await?;
    info!(file = file_id, domain, "shared with domain");
    Ok(())
}
