pub mod classes;
pub mod course;

use std::fmt;

use clap::ValueEnum;

/// Fixed profile of the target student, used in every prompt.
pub const STUDENT_PERSONA: &str = "Usuario de negocios quiere construir productos de datos pero:
- No tiene el hábito o modelo de trabajo mental de tomar decisiones basadas en datos.
- No tiene conocimiento suficiente para traducir sus problemas a productos de datos.
- No tiene habilidades técnicas para manipular data.
- No colabora activamente con equipos de data.
- Tiene poco tiempo y necesita soluciones prácticas que le ayuden a avanzar ya.";

pub const DEFAULT_INDUSTRY: &str = "analítica de datos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Level {
    #[value(alias = "básico")]
    Basico,
    Intermedio,
    Avanzado,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Basico => "básico",
            Level::Intermedio => "intermedio",
            Level::Avanzado => "avanzado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "básico" | "basico" => Some(Level::Basico),
            "intermedio" => Some(Level::Intermedio),
            "avanzado" => Some(Level::Avanzado),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator input for one course.
#[derive(Debug, Clone)]
pub struct CourseBrief {
    pub name: String,
    pub level: Level,
    pub audience: String,
    pub objectives: String,
    pub num_classes: u32,
    pub next_course: String,
}

/// Links produced so far for one course. Passed explicitly between steps and
/// persisted by `db::save_session`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSession {
    pub id: Option<i64>,
    pub course_name: String,
    pub level: Option<Level>,
    pub num_classes: u32,
    pub syllabus_link: Option<String>,
    pub outline_link: Option<String>,
    pub class_links: Vec<String>,
    pub created_at: Option<String>,
}

impl GenerationSession {
    pub fn new(brief: &CourseBrief) -> Self {
        GenerationSession {
            course_name: brief.name.clone(),
            level: Some(brief.level),
            num_classes: brief.num_classes,
            ..Default::default()
        }
    }

    pub fn print_links(&self) {
        if let Some(link) = &self.syllabus_link {
            println!("Syllabus: {}", link);
        }
        if let Some(link) = &self.outline_link {
            println!("Outline:  {}", link);
        }
        for (i, link) in self.class_links.iter().enumerate() {
            println!("Clases parte {}: {}", i + 1, link);
        }
    }
}

pub fn document_url(id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", id)
}

pub fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/edit", id)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{GenerationError, Result};
    use crate::gemini::TextGenerator;
    use crate::google::Workspace;

    /// Answers prompts by the first matching substring rule, else a fixed reply.
    pub struct ScriptedGenerator {
        pub rules: Vec<(String, std::result::Result<String, String>)>,
        pub fallback: String,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(fallback: &str) -> Self {
            ScriptedGenerator {
                rules: Vec::new(),
                fallback: fallback.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn on(mut self, needle: &str, reply: &str) -> Self {
            self.rules.push((needle.to_string(), Ok(reply.to_string())));
            self
        }

        pub fn fail_on(mut self, needle: &str, err: &str) -> Self {
            self.rules.push((needle.to_string(), Err(err.to_string())));
            self
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            for (needle, reply) in &self.rules {
                if prompt.contains(needle.as_str()) {
                    return reply.clone().map_err(|body| GenerationError::Api {
                        service: "gemini",
                        status: 500,
                        body,
                    });
                }
            }
            Ok(self.fallback.clone())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Copy { file_id: String, name: String },
        CreateDocument(String),
        Share { file_id: String, domain: String },
        Replace { doc: String, placeholder: String, text: String },
        Insert { doc: String, index: usize, text: String },
        CreateSpreadsheet(String),
        Write { sheet: String, range: String, values: Vec<Vec<String>> },
    }

    /// Records every call; hands out sequential ids.
    #[derive(Default)]
    pub struct RecordingWorkspace {
        pub calls: Mutex<Vec<Call>>,
        pub sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
        next_id: Mutex<usize>,
    }

    impl RecordingWorkspace {
        fn next(&self, prefix: &str) -> String {
            let mut n = self.next_id.lock().unwrap();
            *n += 1;
            format!("{}-{}", prefix, n)
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Workspace for RecordingWorkspace {
        async fn copy_file(&self, file_id: &str, name: &str) -> Result<String> {
            self.push(Call::Copy {
                file_id: file_id.to_string(),
                name: name.to_string(),
            });
            Ok(self.next("doc"))
        }

        async fn create_document(&self, name: &str) -> Result<String> {
            self.push(Call::CreateDocument(name.to_string()));
            Ok(self.next("doc"))
        }

        async fn share_with_domain(&self, file_id: &str, domain: &str, _discoverable: bool) -> Result<()> {
            self.push(Call::Share {
                file_id: file_id.to_string(),
                domain: domain.to_string(),
            });
            Ok(())
        }

        async fn replace_placeholder(&self, document_id: &str, placeholder: &str, text: &str) -> Result<()> {
            self.push(Call::Replace {
                doc: document_id.to_string(),
                placeholder: placeholder.to_string(),
                text: text.to_string(),
            });
            Ok(())
        }

        async fn insert_text(&self, document_id: &str, index: usize, text: &str) -> Result<()> {
            self.push(Call::Insert {
                doc: document_id.to_string(),
                index,
                text: text.to_string(),
            });
            Ok(())
        }

        async fn create_spreadsheet(&self, title: &str) -> Result<String> {
            self.push(Call::CreateSpreadsheet(title.to_string()));
            Ok(self.next("sheet"))
        }

        async fn write_values(&self, spreadsheet_id: &str, range: &str, values: &[Vec<String>]) -> Result<()> {
            self.push(Call::Write {
                sheet: spreadsheet_id.to_string(),
                range: range.to_string(),
                values: values.to_vec(),
            });
            self.sheets
                .lock()
                .unwrap()
                .insert(spreadsheet_id.to_string(), values.to_vec());
            Ok(())
        }

        async fn read_values(&self, spreadsheet_id: &str, _range: &str) -> Result<Vec<Vec<String>>> {
            Ok(self
                .sheets
                .lock()
                .unwrap()
                .get(spreadsheet_id)
                .cloned()
                .unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(Level::Basico.to_string(), "básico");
        assert_eq!(Level::parse("avanzado"), Some(Level::Avanzado));
        assert_eq!(Level::parse("experto"), None);
    }

    #[test]
    fn urls() {
        assert_eq!(document_url("abc"), "https://docs.google.com/document/d/abc/edit");
        assert_eq!(
            spreadsheet_url("xyz"),
            "https://docs.google.com/spreadsheets/d/xyz/edit"
        );
    }
}
