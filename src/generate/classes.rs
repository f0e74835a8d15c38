use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::document_url;
use crate::batch;
use crate::error::Result;
use crate::gemini::TextGenerator;
use crate::google::{self, Workspace};
use crate::parser::outline::{self, OutlineRow};
use crate::prompts;

/// Cells A..G of the first 100 rows: the seven outline columns.
pub const OUTLINE_READ_RANGE: &str = "A1:G100";

/// Google Docs bodies start at index 1.
const FIRST_BODY_INDEX: usize = 1;

#[derive(Debug, Clone)]
pub struct ClassOptions<'a> {
    pub persona: &'a str,
    pub industry: &'a str,
    pub share_domain: Option<&'a str>,
    pub classes_per_document: usize,
    pub concurrency: usize,
}

/// Read the outline rows back from the spreadsheet behind `outline_link`.
pub async fn read_outline(workspace: &dyn Workspace, outline_link: &str) -> Result<Vec<OutlineRow>> {
    let spreadsheet_id = google::file_id_from_url(outline_link)?;
    let values = workspace.read_values(&spreadsheet_id, OUTLINE_READ_RANGE).await?;
    let rows = outline::rows_from_values(&values);
    info!(spreadsheet = %spreadsheet_id, rows = rows.len(), "read outline");
    Ok(rows)
}

/// Generate every class, then write them into documents of at most
/// `classes_per_document` classes each. Returns one link per document, in order.
pub async fn generate_class_documents(
    generator: Arc<dyn TextGenerator>,
    workspace: &dyn Workspace,
    document_name: &str,
    classes: &[OutlineRow],
    opts: &ClassOptions<'_>,
) -> Result<Vec<String>> {
    // Part sizes are checked before any class is generated.
    let numbers: Vec<usize> = (1..=classes.len()).collect();
    let parts = batch::chunk(&numbers, opts.classes_per_document)?;
    let contents = generate_contents(generator, classes, opts).await;

    let mut links = Vec::with_capacity(parts.len());
    for (part_idx, part) in parts.iter().enumerate() {
        let name = format!("{} - Parte {}", document_name, part_idx + 1);
        let document_id = workspace.create_document(&name).await?;

        let mut cursor = FIRST_BODY_INDEX;
        for &number in part {
            let text = class_block(number, &classes[number - 1].title, &contents[number - 1]);
            workspace.insert_text(&document_id, cursor, &text).await?;
            cursor += utf16_len(&text);
        }

        if let Some(domain) = opts.share_domain {
            workspace.share_with_domain(&document_id, domain, false).await?;
        }
        info!(document = %document_id, classes = part.len(), "class document ready");
        links.push(document_url(&document_id));
    }
    Ok(links)
}

/// One generated text per class, in class order. A failed class carries an
/// inline error note instead of aborting its siblings.
async fn generate_contents(
    generator: Arc<dyn TextGenerator>,
    classes: &[OutlineRow],
    opts: &ClassOptions<'_>,
) -> Vec<String> {
    let total = classes.len();
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} clases") {
        pb.set_style(style.progress_chars("=> "));
    }

    // Workers send (index, text); the slot vector restores class order.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, String)>(total.max(1));
    for (idx, class) in classes.iter().enumerate() {
        let generator = Arc::clone(&generator);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        let prompt = prompts::class_prompt(class, opts.persona, opts.industry);
        let title = class.title.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let text = match generator.generate(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Class {} ({}) failed: {}", idx + 1, title, e);
                    format!("[ERROR al generar esta clase]: {}", e)
                }
            };
            let _ = tx.send((idx, text)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<String>> = vec![None; total];
    while let Some((idx, text)) = rx.recv().await {
        slots[idx] = Some(text);
        pb.inc(1);
    }
    pb.finish_and_clear();

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.unwrap_or_else(|| {
                warn!("Class {} produced no result", i + 1);
                "[ERROR al generar esta clase]: sin respuesta".to_string()
            })
        })
        .collect()
}

fn class_block(number: usize, title: &str, content: &str) -> String {
    format!("\n\nCLASE {}: {}\n\n{}\n", number, title, content.trim())
}

/// Docs locations count UTF-16 code units.
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
