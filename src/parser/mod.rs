pub mod outline;
pub mod sections;

use outline::{OutlineRow, OutlineTable};
use sections::CourseSections;

pub struct ParsedCourse {
    pub sections: CourseSections,
    pub table: OutlineTable,
    pub rows: Vec<OutlineRow>,
}

/// Two-pass decode: tagged text → labeled sections → outline table and rows.
pub fn parse_course_response(text: &str) -> ParsedCourse {
    let sections = CourseSections::from_response(text);
    let table = outline::parse_table(&sections.outline);
    let rows = outline::parse_outline(&sections.outline);
    ParsedCourse {
        sections,
        table,
        rows,
    }
}
