//! Student entity.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::fields::{
    join_names, keep_or_parse, keep_or_replace, parse_date, present, required_text,
};
use super::{EntityKind, Record};
use crate::error::{AppError, Result};

const FIELD_NAMES: [&str; 4] = ["firstName", "lastName", "email", "dateOfBirth"];

/// Stored student fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: DateTime<Utc>,
}

/// Create/update payload for a student.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
}

impl StudentDraft {
    fn presence(&self) -> [bool; 4] {
        [
            present(&self.first_name),
            present(&self.last_name),
            present(&self.email),
            present(&self.date_of_birth),
        ]
    }
}

/// Student statistics summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub student_count: usize,
    /// Mean of calendar-year ages, rounded half up
    pub average_age: i64,
}

/// Student capabilities.
#[derive(Debug, Clone, Copy)]
pub struct Students;

/// Age as a calendar-year difference, ignoring month and day.
pub(crate) fn calendar_age(date_of_birth: &DateTime<Utc>, current_year: i32) -> i64 {
    i64::from(current_year) - i64::from(date_of_birth.year())
}

impl EntityKind for Students {
    type Fields = Student;
    type Draft = StudentDraft;
    type Stats = StudentStats;

    const COLLECTION: &'static str = "students";
    const SINGULAR: &'static str = "Student";
    const PLURAL: &'static str = "Students";

    fn from_draft(draft: StudentDraft) -> Result<Student> {
        let missing: Vec<&str> = FIELD_NAMES
            .iter()
            .zip(draft.presence())
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "{} {} required.",
                join_names(&missing),
                if missing.len() == 1 { "is" } else { "are" }
            )));
        }

        let date_of_birth = parse_date(
            draft.date_of_birth.as_deref().unwrap_or_default(),
            "dateOfBirth",
        )?;

        Ok(Student {
            first_name: required_text(draft.first_name, "firstName")?,
            last_name: required_text(draft.last_name, "lastName")?,
            email: required_text(draft.email, "email")?,
            date_of_birth,
        })
    }

    fn check_patch(patch: &StudentDraft) -> Result<()> {
        if patch.presence().contains(&true) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "At least one field ({}) is required.",
                FIELD_NAMES.join(", ")
            )))
        }
    }

    fn merge(current: &Student, patch: StudentDraft) -> Result<Student> {
        Ok(Student {
            first_name: keep_or_replace(&current.first_name, patch.first_name),
            last_name: keep_or_replace(&current.last_name, patch.last_name),
            email: keep_or_replace(&current.email, patch.email),
            date_of_birth: keep_or_parse(
                current.date_of_birth,
                patch.date_of_birth,
                "dateOfBirth",
            )?,
        })
    }

    fn summarize(records: &[Record<Student>], current_year: i32) -> StudentStats {
        let count = records.len();
        let total_age: i64 = records
            .iter()
            .map(|r| calendar_age(&r.fields.date_of_birth, current_year))
            .sum();

        let average_age = if count == 0 {
            0
        } else {
            (total_age as f64 / count as f64 + 0.5).floor() as i64
        };

        StudentStats {
            student_count: count,
            average_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ObjectId;

    fn draft() -> StudentDraft {
        StudentDraft {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            date_of_birth: Some("2000-12-10".into()),
        }
    }

    fn born(year: i32) -> Record<Student> {
        let mut fields = Students::from_draft(draft()).unwrap();
        fields.date_of_birth = parse_date(&format!("{}-06-30", year), "dateOfBirth").unwrap();
        Record {
            id: ObjectId::new(),
            fields,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_from_draft_complete() {
        let student = Students::from_draft(draft()).unwrap();
        assert_eq!(student.first_name, "Ada");
        assert_eq!(student.date_of_birth.year(), 2000);
    }

    #[test]
    fn test_from_draft_missing_fields() {
        let err = Students::from_draft(StudentDraft {
            email: Some("a@b.c".into()),
            ..Default::default()
        })
        .unwrap_err();

        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "firstName, lastName, and dateOfBirth are required.")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_merge_keeps_omitted_fields() {
        let current = Students::from_draft(draft()).unwrap();
        let merged = Students::merge(
            &current,
            StudentDraft {
                email: Some("countess@example.com".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(merged.email, "countess@example.com");
        assert_eq!(merged.first_name, "Ada");
        assert_eq!(merged.date_of_birth, current.date_of_birth);
    }

    #[test]
    fn test_merge_rejects_unparsable_birth_date() {
        let current = Students::from_draft(draft()).unwrap();
        let result = Students::merge(
            &current,
            StudentDraft {
                date_of_birth: Some("last spring".into()),
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_check_patch_requires_a_field() {
        assert!(matches!(
            Students::check_patch(&StudentDraft::default()),
            Err(AppError::Validation(_))
        ));
        assert!(Students::check_patch(&draft()).is_ok());
    }

    #[test]
    fn test_calendar_age_ignores_month() {
        let dob = parse_date("2000-12-31", "dateOfBirth").unwrap();
        assert_eq!(calendar_age(&dob, 2024), 24);
    }

    #[test]
    fn test_summarize_average_age() {
        let records = vec![born(2000), born(2001), born(2004)];

        // Ages 24, 23, 20 -> mean 22.33
        let stats = Students::summarize(&records, 2024);
        assert_eq!(stats.student_count, 3);
        assert_eq!(stats.average_age, 22);
    }

    #[test]
    fn test_summarize_rounds_half_up() {
        let records = vec![born(2000), born(2001)];

        // Ages 24, 23 -> mean 23.5
        assert_eq!(Students::summarize(&records, 2024).average_age, 24);
    }

    #[test]
    fn test_stats_json_shape() {
        let json = serde_json::to_value(StudentStats {
            student_count: 2,
            average_age: 21,
        })
        .unwrap();
        assert_eq!(json["studentCount"], 2);
        assert_eq!(json["averageAge"], 21);
    }
}
