use rusqlite::Connection;
use tracing::{info, warn};

use super::{document_url, spreadsheet_url, CourseBrief, GenerationSession, STUDENT_PERSONA};
use crate::db;
use crate::error::{GenerationError, Result};
use crate::gemini::TextGenerator;
use crate::google::Workspace;
use crate::parser::outline::{self, OutlineTable};
use crate::parser::sections::CourseSections;
use crate::prompts::{self, SYLLABUS_SECTIONS};

pub const OUTLINE_RANGE: &str = "A1";

/// Where generated files go and who can edit them.
#[derive(Debug, Clone)]
pub struct SyllabusTarget<'a> {
    pub template_id: &'a str,
    pub share_domain: Option<&'a str>,
    pub year: i32,
}

/// Ask for the labeled course data and split it into sections.
///
/// With a cache connection, a previous response to the identical prompt is reused.
pub async fn generate_course_data(
    generator: &dyn TextGenerator,
    cache: Option<&Connection>,
    brief: &CourseBrief,
) -> Result<CourseSections> {
    let prompt = prompts::course_data_prompt(brief, STUDENT_PERSONA);

    let cached = match cache {
        Some(conn) => db::cached_response(conn, &prompt)?,
        None => None,
    };
    let response = match cached {
        Some(hit) => {
            info!(course = %brief.name, "reusing cached course data");
            hit
        }
        None => {
            let fresh = generator.generate(&prompt).await?;
            if let Some(conn) = cache {
                db::store_response(conn, &prompt, &fresh)?;
            }
            fresh
        }
    };

    let course = CourseSections::from_response(&response);
    let missing = course.missing_labels();
    if !missing.is_empty() {
        warn!(?missing, "model response is missing labeled sections");
    }
    Ok(course)
}

/// Fill a copy of the syllabus template and return its edit link.
pub async fn generate_syllabus(
    generator: &dyn TextGenerator,
    workspace: &dyn Workspace,
    target: &SyllabusTarget<'_>,
    brief: &CourseBrief,
    course: &CourseSections,
) -> Result<String> {
    let mut generated = Vec::with_capacity(SYLLABUS_SECTIONS.len());
    for section in &SYLLABUS_SECTIONS {
        let prompt = prompts::syllabus_section_prompt(brief, course, target.year, section);
        let text = generator.generate(&prompt).await?;
        info!(section = section.label, chars = text.len(), "generated syllabus section");
        generated.push((section.placeholder, text.trim().to_string()));
    }

    let document_id = workspace
        .copy_file(target.template_id, &format!("Syllabus - {}", brief.name))
        .await?;
    if let Some(domain) = target.share_domain {
        workspace.share_with_domain(&document_id, domain, true).await?;
    }

    let [first, second, third] = &course.secondary_objectives;
    let mut replacements: Vec<(&str, String)> = vec![
        ("{{nombre_del_curso}}", brief.name.clone()),
        ("{{anio}}", target.year.to_string()),
    ];
    replacements.extend(generated);
    replacements.extend([
        ("{{titulo_primer_objetivo_secundario}}", first.title.clone()),
        ("{{descripcion_primer_objetivo_secundario}}", first.description.clone()),
        ("{{titulo_segundo_objetivo_secundario}}", second.title.clone()),
        ("{{descripcion_segundo_objetivo_secundario}}", second.description.clone()),
        ("{{titulo_tercer_objetivo_secundario}}", third.title.clone()),
        ("{{descripcion_tercer_objetivo_secundario}}", third.description.clone()),
    ]);

    for (placeholder, text) in &replacements {
        workspace.replace_placeholder(&document_id, placeholder, text).await?;
    }

    Ok(document_url(&document_id))
}

/// Upload the outline table to a new spreadsheet and return its edit link.
pub async fn generate_outline_sheet(
    workspace: &dyn Workspace,
    share_domain: Option<&str>,
    course_name: &str,
    outline_text: &str,
) -> Result<(String, OutlineTable)> {
    let table = outline::parse_table(outline_text);
    if table.is_empty() {
        return Err(GenerationError::EmptyResponse("outline table"));
    }
    info!(columns = table.headers.len(), rows = table.rows.len(), "parsed outline");

    let spreadsheet_id = workspace
        .create_spreadsheet(&format!("Outline - {}", course_name))
        .await?;
    if let Some(domain) = share_domain {
        workspace.share_with_domain(&spreadsheet_id, domain, true).await?;
    }
    workspace
        .write_values(&spreadsheet_id, OUTLINE_RANGE, &table.to_values())
        .await?;

    Ok((spreadsheet_url(&spreadsheet_id), table))
}

/// Course data → syllabus document → outline spreadsheet, recorded in `session`.
pub async fn generate_course(
    generator: &dyn TextGenerator,
    workspace: &dyn Workspace,
    cache: Option<&Connection>,
    target: &SyllabusTarget<'_>,
    brief: &CourseBrief,
    mut session: GenerationSession,
) -> Result<GenerationSession> {
    let course = generate_course_data(generator, cache, brief).await?;

    let syllabus = generate_syllabus(generator, workspace, target, brief, &course).await?;
    info!(link = %syllabus, "syllabus ready");
    session.syllabus_link = Some(syllabus);

    let (outline_link, table) =
        generate_outline_sheet(workspace, target.share_domain, &brief.name, &course.outline).await?;
    info!(link = %outline_link, classes = table.rows.len(), "outline ready");
    if table.rows.len() != brief.num_classes as usize {
        warn!(
            expected = brief.num_classes,
            got = table.rows.len(),
            "outline class count differs from request"
        );
    }
    session.outline_link = Some(outline_link);
    session.class_links.clear();

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::testing::{Call, RecordingWorkspace, ScriptedGenerator};
    use crate::generate::Level;

    fn brief() -> CourseBrief {
        CourseBrief {
            name: "Estrategia de Datos".into(),
            level: Level::Basico,
            audience: "Gerentes".into(),
            objectives: "Decidir con datos".into(),
            num_classes: 4,
            next_course: "N/A".into(),
        }
    }

    fn generator() -> ScriptedGenerator {
        let fixture = std::fs::read_to_string("tests/fixtures/course_response.txt").unwrap();
        ScriptedGenerator::new(&fixture)
            .on("[GENERALIDADES_DEL_PROGRAMA]", "Un curso práctico.")
            .on("sección: [PERFIL_INGRESO]", "Perfil claro.")
            .on("[DETALLES_PLAN_ESTUDIOS]", "1. Decisiones\n2. Producto")
    }

    const TARGET: SyllabusTarget<'static> = SyllabusTarget {
        template_id: "template-1",
        share_domain: Some("example.edu"),
        year: 2026,
    };

    #[tokio::test]
    async fn course_data_cached_by_prompt() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let gen = generator();

        let first = generate_course_data(&gen, Some(&conn), &brief()).await.unwrap();
        let second = generate_course_data(&gen, Some(&conn), &brief()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(gen.prompt_count(), 1);

        let mut other = brief();
        other.num_classes = 8;
        generate_course_data(&gen, Some(&conn), &other).await.unwrap();
        assert_eq!(gen.prompt_count(), 2);
    }

    #[tokio::test]
    async fn syllabus_fills_every_placeholder() {
        let gen = generator();
        let ws = RecordingWorkspace::default();
        let course = generate_course_data(&gen, None, &brief()).await.unwrap();

        let link = generate_syllabus(&gen, &ws, &TARGET, &brief(), &course).await.unwrap();
        assert_eq!(link, "https://docs.google.com/document/d/doc-1/edit");

        let calls = ws.calls();
        assert_eq!(
            calls[0],
            Call::Copy {
                file_id: "template-1".into(),
                name: "Syllabus - Estrategia de Datos".into()
            }
        );
        assert!(matches!(&calls[1], Call::Share { domain, .. } if domain == "example.edu"));

        let replaced: Vec<(String, String)> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Replace { placeholder, text, .. } => Some((placeholder.clone(), text.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(replaced.len(), 11);
        assert!(replaced.contains(&("{{anio}}".into(), "2026".into())));
        assert!(replaced.contains(&("{{perfil_ingreso}}".into(), "Perfil claro.".into())));
        assert!(replaced.contains(&(
            "{{titulo_tercer_objetivo_secundario}}".into(),
            "Colaboración con equipos de datos".into()
        )));
    }

    #[tokio::test]
    async fn outline_sheet_uploads_header_and_rows() {
        let gen = generator();
        let ws = RecordingWorkspace::default();
        let course = generate_course_data(&gen, None, &brief()).await.unwrap();

        let (link, table) = generate_outline_sheet(&ws, None, "Estrategia de Datos", &course.outline)
            .await
            .unwrap();
        assert_eq!(link, "https://docs.google.com/spreadsheets/d/sheet-1/edit");
        assert_eq!(table.rows.len(), 4);

        let calls = ws.calls();
        assert_eq!(calls[0], Call::CreateSpreadsheet("Outline - Estrategia de Datos".into()));
        match &calls[1] {
            Call::Write { range, values, .. } => {
                assert_eq!(range, "A1");
                assert_eq!(values.len(), 5);
                assert_eq!(values[0][0], "Clase");
                assert_eq!(values[0].len(), 7);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn outline_without_table_fails() {
        let ws = RecordingWorkspace::default();
        let err = generate_outline_sheet(&ws, None, "X", "sin tabla").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse(_)));
        assert!(ws.calls().is_empty());
    }

    #[tokio::test]
    async fn full_course_records_links() {
        let gen = generator();
        let ws = RecordingWorkspace::default();
        let session = GenerationSession::new(&brief());
        let session = generate_course(&gen, &ws, None, &TARGET, &brief(), session)
            .await
            .unwrap();
        assert!(session.syllabus_link.is_some());
        assert!(session.outline_link.as_deref().unwrap().contains("/spreadsheets/d/"));
        // course data + three syllabus sections
        assert_eq!(gen.prompt_count(), 4);
    }

    #[tokio::test]
    async fn generator_failure_propagates() {
        let gen = ScriptedGenerator::new("").fail_on("Curso:", "quota exceeded");
        let ws = RecordingWorkspace::default();
        let err = generate_course(&gen, &ws, None, &TARGET, &brief(), GenerationSession::new(&brief()))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 500, .. }));
        assert!(ws.calls().is_empty());
    }
}
