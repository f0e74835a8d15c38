use regex::Regex;

pub const PERFIL_INGRESO: &str = "PERFIL_INGRESO";
pub const OBJETIVOS: &str = "OBJETIVOS";
pub const PERFIL_EGRESO: &str = "PERFIL_EGRESO";
pub const OUTLINE: &str = "OUTLINE";
pub const TITULO_PRIMER_OBJETIVO: &str = "TITULO_PRIMER_OBJETIVO_SECUNDARIO";
pub const DESCRIPCION_PRIMER_OBJETIVO: &str = "DESCRIPCION_PRIMER_OBJETIVO_SECUNDARIO";
pub const TITULO_SEGUNDO_OBJETIVO: &str = "TITULO_SEGUNDO_OBJETIVO_SECUNDARIO";
pub const DESCRIPCION_SEGUNDO_OBJETIVO: &str = "DESCRIPCION_SEGUNDO_OBJETIVO_SECUNDARIO";
pub const TITULO_TERCER_OBJETIVO: &str = "TITULO_TERCER_OBJETIVO_SECUNDARIO";
pub const DESCRIPCION_TERCER_OBJETIVO: &str = "DESCRIPCION_TERCER_OBJETIVO_SECUNDARIO";

/// Labels requested from the model for the general course data, in prompt order.
pub const COURSE_LABELS: [&str; 10] = [
    PERFIL_INGRESO,
    OBJETIVOS,
    PERFIL_EGRESO,
    OUTLINE,
    TITULO_PRIMER_OBJETIVO,
    DESCRIPCION_PRIMER_OBJETIVO,
    TITULO_SEGUNDO_OBJETIVO,
    DESCRIPCION_SEGUNDO_OBJETIVO,
    TITULO_TERCER_OBJETIVO,
    DESCRIPCION_TERCER_OBJETIVO,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSection {
    pub label: String,
    pub body: String,
}

/// Body of `[label]` up to the next `[` (or end of text), trimmed.
///
/// A label that never appears yields an empty string. A body that itself
/// contains `[` is cut at that bracket.
pub fn extract(text: &str, label: &str) -> String {
    let pattern = format!(r"(?s)\[{}\][ \t]*\r?\n(.*?)(?:\[|\z)", regex::escape(label));
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Extract every label, keeping the caller's order. Missing labels get empty bodies.
pub fn extract_all(text: &str, labels: &[&str]) -> Vec<LabeledSection> {
    labels
        .iter()
        .map(|label| LabeledSection {
            label: label.to_string(),
            body: extract(text, label),
        })
        .collect()
}

/// The ten labeled fields of the general course data response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseSections {
    pub perfil_ingreso: String,
    pub objetivos: String,
    pub perfil_egreso: String,
    pub outline: String,
    pub secondary_objectives: [SecondaryObjective; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecondaryObjective {
    pub title: String,
    pub description: String,
}

impl CourseSections {
    pub fn from_response(text: &str) -> Self {
        let mut bodies = extract_all(text, &COURSE_LABELS).into_iter().map(|s| s.body);
        let mut next = || bodies.next().unwrap_or_default();
        let perfil_ingreso = next();
        let objetivos = next();
        let perfil_egreso = next();
        let outline = next();
        let mut objective = || SecondaryObjective {
            title: next(),
            description: next(),
        };
        let secondary_objectives = [objective(), objective(), objective()];
        CourseSections {
            perfil_ingreso,
            objetivos,
            perfil_egreso,
            outline,
            secondary_objectives,
        }
    }

    /// Every field paired with its label, in `COURSE_LABELS` order.
    pub fn labeled(&self) -> Vec<(&'static str, &str)> {
        let [first, second, third] = &self.secondary_objectives;
        let bodies = [
            &self.perfil_ingreso,
            &self.objetivos,
            &self.perfil_egreso,
            &self.outline,
            &first.title,
            &first.description,
            &second.title,
            &second.description,
            &third.title,
            &third.description,
        ];
        COURSE_LABELS
            .iter()
            .zip(bodies)
            .map(|(label, body)| (*label, body.as_str()))
            .collect()
    }

    /// Labels whose body came back empty, for partial-output warnings.
    pub fn missing_labels(&self) -> Vec<&'static str> {
        self.labeled()
            .into_iter()
            .filter(|(_, body)| body.is_empty())
            .map(|(label, _)| label)
            .collect()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const TAGGED: &str = "[PERFIL_INGRESO]\nProfesionales de negocio.\n\n[OBJETIVOS]\n- Decidir con datos\n- Priorizar casos\n[PERFIL_EGRESO]\nLidera proyectos de datos.";

    #[test]
    fn extracts_between_markers() {
        assert_eq!(extract(TAGGED, "PERFIL_INGRESO"), "Profesionales de negocio.");
        assert_eq!(extract(TAGGED, "OBJETIVOS"), "- Decidir con datos\n- Priorizar casos");
    }

    #[test]
    fn last_section_runs_to_end() {
        assert_eq!(extract(TAGGED, "PERFIL_EGRESO"), "Lidera proyectos de datos.");
    }

    #[test]
    fn missing_label_is_empty() {
        assert_eq!(extract(TAGGED, "MISSING"), "");
        assert_eq!(extract("", "OUTLINE"), "");
    }

    #[test]
    fn label_without_newline_is_not_a_marker() {
        assert_eq!(extract("see [OUTLINE] below", "OUTLINE"), "");
    }

    #[test]
    fn order_independent() {
        let permuted = "[PERFIL_EGRESO]\nLidera proyectos de datos.\n[OBJETIVOS]\n- Decidir con datos\n- Priorizar casos\n[PERFIL_INGRESO]\nProfesionales de negocio.\n";
        for label in ["PERFIL_INGRESO", "OBJETIVOS", "PERFIL_EGRESO"] {
            assert_eq!(extract(TAGGED, label), extract(permuted, label), "{label}");
        }
    }

    #[test]
    fn prefix_label_does_not_match_longer_label() {
        let text = "[OBJETIVOS_EXTRA]\nno\n[OBJETIVOS]\nsi\n";
        assert_eq!(extract(text, "OBJETIVOS"), "si");
    }

    #[test]
    fn literal_bracket_in_body_cuts_section() {
        let text = "[OBJETIVOS]\nVer cita [1] del autor\n";
        assert_eq!(extract(text, "OBJETIVOS"), "Ver cita");
    }

    #[test]
    fn crlf_markers() {
        let text = "[OUTLINE]\r\n| a | b |\r\n";
        assert_eq!(extract(text, "OUTLINE"), "| a | b |");
    }

    #[test]
    fn extract_all_keeps_order_and_degrades() {
        let sections = extract_all(TAGGED, &["OBJETIVOS", "OUTLINE"]);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].label, "OBJETIVOS");
        assert!(!sections[0].body.is_empty());
        assert_eq!(sections[1].label, "OUTLINE");
        assert!(sections[1].body.is_empty());
    }

    #[test]
    fn course_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/course_response.txt").unwrap();
        let course = CourseSections::from_response(&text);
        assert!(course.perfil_ingreso.starts_with("Líderes de negocio"));
        assert!(course.outline.contains("| Clase |"));
        assert_eq!(course.secondary_objectives[0].title, "Pensamiento basado en datos");
        assert_eq!(course.secondary_objectives[2].title, "Colaboración con equipos de datos");
        assert!(course.missing_labels().is_empty(), "{:?}", course.missing_labels());
    }

    #[test]
    fn partial_response_reports_missing() {
        let course = CourseSections::from_response(TAGGED);
        let missing = course.missing_labels();
        assert!(missing.contains(&OUTLINE));
        assert!(!missing.contains(&OBJETIVOS));
        assert_eq!(missing.len(), 7);
    }

    #[test]
    fn labeled_view_follows_label_order() {
        let course = CourseSections::from_response(TAGGED);
        let labeled = course.labeled();
        assert_eq!(labeled.len(), COURSE_LABELS.len());
        assert_eq!(labeled[0], (PERFIL_INGRESO, "Profesionales de negocio."));
        assert_eq!(labeled[2], (PERFIL_EGRESO, "Lidera proyectos de datos."));
        assert_eq!(labeled[3], (OUTLINE, ""));
        assert_eq!(labeled[9].0, DESCRIPCION_TERCER_OBJETIVO);
    }
}
