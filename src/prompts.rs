//! Prompt templates sent to the text generator.
//!
//! The general course prompt asks for label-tagged output (`[LABEL]` headers)
//! so the response can be split with `parser::sections::extract`.

use crate::generate::CourseBrief;
use crate::parser::outline::OutlineRow;
use crate::parser::sections::{CourseSections, COURSE_LABELS, OUTLINE};

pub const OUTLINE_HEADER: &str =
    "| Clase | Título | Conceptos Clave | Objetivo 1 | Objetivo 2 | Objetivo 3 | Descripción |";

/// A syllabus section requested with its own follow-up prompt.
pub struct SyllabusSection {
    pub label: &'static str,
    pub placeholder: &'static str,
    instruction: &'static str,
}

pub const SYLLABUS_SECTIONS: [SyllabusSection; 3] = [
    SyllabusSection {
        label: "GENERALIDADES_DEL_PROGRAMA",
        placeholder: "{{generalidades_del_programa}}",
        instruction: "Redacta un párrafo breve que combine descripción general del curso, su objetivo y el perfil de egreso.",
    },
    SyllabusSection {
        label: "PERFIL_INGRESO",
        placeholder: "{{perfil_ingreso}}",
        instruction: "Redacta un párrafo claro y directo del perfil de ingreso del estudiante.",
    },
    SyllabusSection {
        label: "DETALLES_PLAN_ESTUDIOS",
        placeholder: "{{detalles_plan_estudios}}",
        instruction: "Escribe la lista de las {num_classes} clases, cada una con título y una breve descripción, NO usar negritas en markdown.",
    },
];

pub fn course_data_prompt(brief: &CourseBrief, persona: &str) -> String {
    let mut labels = String::new();
    for label in COURSE_LABELS {
        labels.push_str(&format!("[{}]\n...\n", label));
        if label == OUTLINE {
            labels.push('\n');
        }
    }

    format!(
        "Eres un experto en diseño instruccional y un tutor experimentado que aplica la ciencia del aprendizaje
para crear experiencias educativas efectivas. Genera un syllabus y un outline que fomenten el aprendizaje
activo, gestionen la carga cognitiva del estudiante y despierten su curiosidad y metacognición.

Datos del curso:
- Curso: {name}
- Nivel: {level}
- Público objetivo: {audience}
- Perfil base del estudiante: {persona}
- Objetivos iniciales: {objectives}
- Curso sugerido posterior: {next} (no lo menciones directamente)

Devuelve lo siguiente, separado por etiquetas:

{labels}
El outline debe incluir exactamente {num_classes} clases, organizadas en semanas lógicas
(por ejemplo, 4 por semana si son 12 en total), en formato de tabla Markdown con estas columnas:

{header}
",
        name = brief.name,
        level = brief.level,
        audience = brief.audience,
        persona = persona,
        objectives = brief.objectives,
        next = brief.next_course,
        labels = labels,
        num_classes = brief.num_classes,
        header = OUTLINE_HEADER,
    )
}

pub fn syllabus_section_prompt(
    brief: &CourseBrief,
    course: &CourseSections,
    year: i32,
    section: &SyllabusSection,
) -> String {
    let instruction = section
        .instruction
        .replace("{num_classes}", &brief.num_classes.to_string());
    format!(
        "Como experto en diseño instruccional y aplicando los principios de la ciencia del aprendizaje, genera el siguiente contenido:
Curso: {name}
Año: {year}
Nivel: {level}
Objetivos: {objectives}
Perfil de ingreso: {ingreso}
Perfil de egreso: {egreso}
Outline:
{outline}
Devuelve únicamente el contenido para la sección: [{label}]
{instruction}
",
        name = brief.name,
        year = year,
        level = brief.level,
        objectives = course.objetivos,
        ingreso = course.perfil_ingreso,
        egreso = course.perfil_egreso,
        outline = course.outline,
        label = section.label,
        instruction = instruction,
    )
}

const SLIDE_STRUCTURE: &str = "1. Bienvenida y título de la clase
2. Objetivos de aprendizaje
3. Relevancia del tema en el mundo actual (con fuente real si das datos)
4. Dolor empresarial que resuelve el tema
5. Concepto clave 1: definición clara y utilidad
6. Concepto clave 1: clasificaciones, componentes o tipos
7. Concepto clave 1: caso de uso real con métricas o impacto + link
8. Concepto clave 2: qué es, cómo funciona, rol en la empresa
9. Concepto clave 2: herramientas del mercado con comparación concreta
10. Concepto clave 2: otro ejemplo con link
11. Proceso paso a paso para implementar lo aprendido
12. Errores comunes cometidos por empresas y cómo evitarlos
13. Mitos vs realidades que confunden a los líderes
14. Beneficios tangibles (costo, ROI, crecimiento)
15. Tips de implementación efectivos en la práctica
16. KPIs o métricas clave para evaluar éxito
17. Cómo gestionar resistencia al cambio al aplicar este tema
18. Preguntas reflexivas para el alumno y su contexto
19. Actividad práctica
20. Cierre con resumen y llamada a la acción";

pub fn class_prompt(class: &OutlineRow, persona: &str, industry: &str) -> String {
    format!(
        "Actúa como un diseñador instruccional experto y un tutor experimentado en tecnología, negocios y analítica
de datos. Genera TODO el contenido detallado y final de una clase de 20 slides, aplicando la ciencia del
aprendizaje para maximizar comprensión, retención y aplicación práctica. Fomenta el aprendizaje activo,
la curiosidad y la reflexión, y presenta la información de forma clara y estructurada.

Cada slide debe contener:
1. TÍTULO en mayúsculas
2. TEXTO COMPLETO explicativo (mínimo 5 a 7 líneas), listo para presentación, sin frases genéricas.
3. Un EJEMPLO o caso de uso empresarial robusto con empresas reales, métricas o decisiones estratégicas,
   con un link verificable como fuente. Si no hay fuente real, no lo uses.
4. Un TIP o recomendación práctica basada en experiencia real.
5. Un RECURSO VISUAL sugerido (gráfico, dashboard, proceso, etc.)

ESTRUCTURA DE LOS 20 SLIDES:

{structure}

Contexto:
- Título de la clase: {title}
- Descripción: {description}
- Objetivos: {objectives}
- Conceptos clave: {concepts}
- Perfil del estudiante: {persona}
- Industria de enfoque: {industry}

No uses frases como \"puedes incluir\" o \"se recomienda mostrar\". Escribe el contenido real final como si
fuera a presentarse en un aula. Evita repeticiones y asegura profundidad en cada slide.
",
        structure = SLIDE_STRUCTURE,
        title = class.title,
        description = class.description,
        objectives = class.objectives.join("; "),
        concepts = class.key_concepts,
        persona = persona,
        industry = industry,
    )
}
