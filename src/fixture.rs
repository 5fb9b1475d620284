use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::models::{CourseRecord, RecordGroup};

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    #[serde(default)]
    semester: String,
    groups: Vec<FixtureGroup>,
}

#[derive(Debug, Deserialize)]
struct FixtureGroup {
    label: String,
    #[serde(default)]
    courses: Vec<CourseRecord>,
}

pub fn load_fixture(path: &Path) -> Result<Vec<RecordGroup>, AppError> {
    let text = std::fs::read_to_string(path)?;
    let groups = parse_fixture(&text)?;
    info!(
        "Loaded {} groups ({} courses) from {}",
        groups.len(),
        groups.iter().map(|g| g.records.len()).sum::<usize>(),
        path.display()
    );
    Ok(groups)
}

/// Missing `semester`/`department` on a course fall back to the catalog
/// semester and the group label.
pub fn parse_fixture(text: &str) -> Result<Vec<RecordGroup>, AppError> {
    let fixture: CatalogFixture = serde_json::from_str(text).map_err(AppError::Fixture)?;

    let groups = fixture
        .groups
        .into_iter()
        .map(|group| {
            let records = group
                .courses
                .into_iter()
                .map(|mut course| {
                    if course.semester.is_empty() {
                        course.semester = fixture.semester.clone();
                    }
                    if course.department.is_empty() {
                        course.department = group.label.clone();
                    }
                    course
                })
                .collect();
            RecordGroup::new(group.label, records)
        })
        .collect();

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_parse_fills_semester_and_department() {
        let text = r#"{
            "semester": "2025-2",
            "groups": [
                {
                    "label": "Economics",
                    "courses": [
                        {
                            "grade": 2,
                            "category": "required_major",
                            "code": "31201",
                            "division": "01",
                            "name": "Microeconomics",
                            "credits": 3,
                            "professor": "Park",
                            "schedule": [{ "day": 1, "startPeriod": 2, "endPeriod": 3 }],
                            "location": "E-101"
                        },
                        {
                            "grade": 4,
                            "category": "elective_major",
                            "code": "31490",
                            "name": "Field Study",
                            "credits": 1,
                            "semester": "2025-S",
                            "department": "Economics (joint)"
                        }
                    ]
                },
                { "label": "Empty" }
            ]
        }"#;

        let groups = parse_fixture(text).expect("Failed to parse fixture");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Economics");

        let first = &groups[0].records[0];
        assert_eq!(first.semester, "2025-2");
        assert_eq!(first.department, "Economics");
        assert_eq!(first.category, Category::RequiredMajor);
        assert_eq!(first.schedule[0].end_period, 3);

        let second = &groups[0].records[1];
        assert_eq!(second.semester, "2025-S");
        assert_eq!(second.department, "Economics (joint)");
        assert!(second.schedule.is_empty());

        assert!(groups[1].records.is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let result = parse_fixture(r#"{ "groups": [ { "label": "X", "courses": [ { "code": 1 } ] } ] }"#);
        assert!(matches!(result, Err(AppError::Fixture(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_fixture(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
