use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// コース区分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    RequiredMajor,
    ElectiveMajor,
    GeneralEducation,
    TeacherTraining,
    /// Unknown labels are kept verbatim.
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::RequiredMajor => "required_major",
            Category::ElectiveMajor => "elective_major",
            Category::GeneralEducation => "general_education",
            Category::TeacherTraining => "teacher_training",
            Category::Other(label) => label,
        }
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        match label.as_str() {
            "required_major" => Category::RequiredMajor,
            "elective_major" => Category::ElectiveMajor,
            "general_education" => Category::GeneralEducation,
            "teacher_training" => Category::TeacherTraining,
            _ => Category::Other(label),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    /// 1 = Monday .. 7 = Sunday
    pub day: u8,
    pub start_period: u8,
    pub end_period: u8,
}

impl ScheduleSlot {
    pub fn is_well_formed(&self) -> bool {
        (1..=7).contains(&self.day) && self.start_period <= self.end_period
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub grade: u8,
    pub category: Category,
    pub code: String,
    #[serde(default)]
    pub division: String,
    pub name: String,
    pub credits: u32,
    #[serde(default)]
    pub professor: String,
    #[serde(default)]
    pub schedule: Vec<ScheduleSlot>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub department: String,
}

impl CourseRecord {
    pub fn has_well_formed_schedule(&self) -> bool {
        self.schedule.iter().all(ScheduleSlot::is_well_formed)
    }
}

/// A record as it is persisted: the course fields plus the write-time stamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDocument {
    #[serde(flatten)]
    pub record: CourseRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseDocument {
    pub fn stamp(record: CourseRecord, now: DateTime<Utc>) -> Self {
        Self {
            record,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Records that are loaded and reported together, e.g. one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordGroup {
    pub label: String,
    pub records: Vec<CourseRecord>,
}

impl RecordGroup {
    pub fn new(label: impl Into<String>, records: Vec<CourseRecord>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_keeps_unknown_label() {
        let category: Category = serde_json::from_str("\"seminar\"").unwrap();
        assert_eq!(category, Category::Other("seminar".to_string()));
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"seminar\"");

        let known: Category = serde_json::from_str("\"elective_major\"").unwrap();
        assert_eq!(known, Category::ElectiveMajor);
    }

    #[test]
    fn test_record_defaults_optional_fields() {
        let json = r#"{
            "grade": 1,
            "category": "general_education",
            "code": "10021",
            "name": "Academic Writing",
            "credits": 2
        }"#;
        let record: CourseRecord = serde_json::from_str(json).unwrap();
        assert!(record.schedule.is_empty());
        assert!(record.professor.is_empty());
        assert!(record.division.is_empty());
        assert!(record.has_well_formed_schedule());
    }

    #[test]
    fn test_schedule_slot_well_formed() {
        let ok = ScheduleSlot { day: 2, start_period: 3, end_period: 4 };
        let reversed = ScheduleSlot { day: 2, start_period: 5, end_period: 4 };
        let bad_day = ScheduleSlot { day: 8, start_period: 1, end_period: 1 };
        assert!(ok.is_well_formed());
        assert!(!reversed.is_well_formed());
        assert!(!bad_day.is_well_formed());
    }

    #[test]
    fn test_document_flattens_record_with_camel_case_stamps() {
        let record = CourseRecord {
            grade: 3,
            category: Category::RequiredMajor,
            code: "21639".to_string(),
            division: "01".to_string(),
            name: "Operating Systems".to_string(),
            credits: 3,
            professor: String::new(),
            schedule: vec![ScheduleSlot { day: 1, start_period: 1, end_period: 2 }],
            location: String::new(),
            note: String::new(),
            semester: "2025-2".to_string(),
            department: "Computer Science".to_string(),
        };
        let now = Utc::now();
        let value = serde_json::to_value(CourseDocument::stamp(record, now)).unwrap();

        assert_eq!(value["code"], "21639");
        assert_eq!(value["schedule"][0]["startPeriod"], 1);
        assert_eq!(value["createdAt"], value["updatedAt"]);
    }
}
