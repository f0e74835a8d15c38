mod batch;
mod config;
mod db;
mod error;
mod gemini;
mod generate;
mod google;
mod parser;
mod prompts;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use chrono::Datelike;
use clap::{Parser, Subcommand};

use config::Settings;
use gemini::{GeminiClient, TextGenerator};
use generate::classes::{self, ClassOptions};
use generate::course::{self, SyllabusTarget};
use generate::{CourseBrief, GenerationSession, Level, DEFAULT_INDUSTRY, STUDENT_PERSONA};
use google::GoogleWorkspace;

#[derive(Parser)]
#[command(name = "syllabus_gen", about = "Course syllabus, outline and class generator (Gemini + Google Workspace)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate course data, the syllabus document and the outline spreadsheet
    Syllabus {
        /// Course name
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        level: Level,
        /// Target audience
        #[arg(long)]
        audience: String,
        /// Raw learning objectives
        #[arg(long)]
        objectives: String,
        /// Number of classes
        #[arg(short = 'n', long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(4..=24))]
        classes: u32,
        /// Course that follows this one
        #[arg(long, default_value = "N/A")]
        next_course: String,
        /// Ignore cached course data and ask the model again
        #[arg(long)]
        fresh: bool,
    },
    /// Generate full class documents from a session's outline spreadsheet
    Classes {
        /// Session id (default: latest)
        #[arg(short, long)]
        session: Option<i64>,
        /// Industry used for examples in every class
        #[arg(long, default_value = DEFAULT_INDUSTRY)]
        industry: String,
        /// Base document name (default: "Clases - <course>")
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the links of a session
    Show {
        /// Session id (default: latest)
        #[arg(short, long)]
        session: Option<i64>,
    },
    /// List recent sessions
    History {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Split a saved model response into sections and outline rows (offline)
    Parse {
        file: PathBuf,
        /// Print the outline rows as JSON objects keyed by header
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Syllabus {
            name,
            level,
            audience,
            objectives,
            classes,
            next_course,
            fresh,
        } => {
            let settings = Settings::load()?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;

            let generator = GeminiClient::from_settings(&settings)?;
            let workspace = GoogleWorkspace::from_settings(&settings)?;
            let target = SyllabusTarget {
                template_id: settings.syllabus_template_id()?,
                share_domain: settings.share_domain(),
                year: chrono::Local::now().year(),
            };
            let brief = CourseBrief {
                name,
                level,
                audience,
                objectives,
                num_classes: classes,
                next_course,
            };

            println!("Generating syllabus and outline for '{}' ({} classes)...", brief.name, classes);
            if fresh {
                let prompt = prompts::course_data_prompt(&brief, STUDENT_PERSONA);
                db::forget_response(&conn, &prompt)?;
            }
            let session = GenerationSession::new(&brief);
            let mut session =
                course::generate_course(&generator, &workspace, Some(&conn), &target, &brief, session)
                    .await
                    .context("Course generation failed")?;
            session.id = Some(db::save_session(&conn, &session)?);

            println!("\nSession {}:", session.id.unwrap_or_default());
            session.print_links();
            Ok(())
        }
        Commands::Classes {
            session,
            industry,
            name,
        } => {
            let settings = Settings::load()?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;

            let Some(mut session) = db::load_session(&conn, session)? else {
                println!("No session found. Run 'syllabus' first.");
                return Ok(());
            };
            let Some(outline_link) = session.outline_link.clone() else {
                bail!("Session {} has no outline link", session.id.unwrap_or_default());
            };

            let workspace = GoogleWorkspace::from_settings(&settings)?;
            let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_settings(&settings)?);

            let rows = classes::read_outline(&workspace, &outline_link)
                .await
                .context("Failed to read outline spreadsheet")?;
            if rows.is_empty() {
                println!("Outline has no complete class rows.");
                return Ok(());
            }

            let document_name = name.unwrap_or_else(|| format!("Clases - {}", session.course_name));
            let opts = ClassOptions {
                persona: STUDENT_PERSONA,
                industry: &industry,
                share_domain: settings.share_domain(),
                classes_per_document: settings.classes_per_document,
                concurrency: settings.class_concurrency,
            };

            println!("Generating {} classes into '{}'...", rows.len(), document_name);
            session.class_links =
                classes::generate_class_documents(generator, &workspace, &document_name, &rows, &opts)
                    .await
                    .context("Class generation failed")?;
            db::save_session(&conn, &session)?;

            println!();
            session.print_links();
            Ok(())
        }
        Commands::Show { session } => {
            let settings = Settings::load()?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;

            match db::load_session(&conn, session)? {
                Some(s) => {
                    println!(
                        "Session {}: {} ({}, {} classes) created {}",
                        s.id.unwrap_or_default(),
                        s.course_name,
                        s.level.map(Level::as_str).unwrap_or("-"),
                        s.num_classes,
                        s.created_at.as_deref().unwrap_or("-"),
                    );
                    s.print_links();
                }
                None => println!("No session found."),
            }
            Ok(())
        }
        Commands::History { limit } => {
            let settings = Settings::load()?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;

            let sessions = db::list_sessions(&conn, limit)?;
            if sessions.is_empty() {
                println!("No sessions yet.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<32} | {:<10} | {:>7} | {:<8} | {:>5}",
                "#", "Course", "Level", "Classes", "Outline", "Docs"
            );
            println!("{}", "-".repeat(82));
            for s in &sessions {
                println!(
                    "{:>4} | {:<32} | {:<10} | {:>7} | {:<8} | {:>5}",
                    s.id.unwrap_or_default(),
                    truncate(&s.course_name, 32),
                    s.level.map(Level::as_str).unwrap_or("-"),
                    s.num_classes,
                    if s.outline_link.is_some() { "yes" } else { "no" },
                    s.class_links.len(),
                );
            }
            Ok(())
        }
        Commands::Parse { file, json } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parsed = parser::parse_course_response(&text);

            if json {
                let records: Vec<serde_json::Map<String, serde_json::Value>> = parsed
                    .table
                    .records()
                    .into_iter()
                    .map(|pairs| {
                        pairs
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                            .collect()
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }

            for (label, body) in parsed.sections.labeled() {
                let body = if body.is_empty() {
                    "(missing)".to_string()
                } else {
                    truncate(&body.replace('\n', " "), 80)
                };
                println!("[{}] {}", label, body);
            }

            println!();
            if parsed.table.is_empty() {
                println!("No outline table found.");
            } else {
                print!("{}", parsed.table.to_markdown());
                println!(
                    "\n{} table rows, {} complete classes",
                    parsed.table.rows.len(),
                    parsed.rows.len()
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
