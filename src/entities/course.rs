//! Course entity.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fields::{
    join_names, keep_or_parse, keep_or_replace, parse_date, present, required_text,
};
use super::{EntityKind, Record};
use crate::error::{AppError, Result};

const FIELD_NAMES: [&str; 6] = [
    "title",
    "description",
    "category",
    "instructor",
    "startDate",
    "endDate",
];

/// Stored course fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub title: String,
    pub description: String,
    pub category: String,
    pub instructor: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Create/update payload for a course.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub instructor: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CourseDraft {
    fn presence(&self) -> [bool; 6] {
        [
            present(&self.title),
            present(&self.description),
            present(&self.category),
            present(&self.instructor),
            present(&self.start_date),
            present(&self.end_date),
        ]
    }
}

/// Course statistics summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    pub total_courses: usize,
    pub total_categories: usize,
    pub total_instructors: usize,
}

/// Course capabilities.
#[derive(Debug, Clone, Copy)]
pub struct Courses;

impl EntityKind for Courses {
    type Fields = Course;
    type Draft = CourseDraft;
    type Stats = CourseStats;

    const COLLECTION: &'static str = "courses";
    const SINGULAR: &'static str = "Course";
    const PLURAL: &'static str = "Courses";

    fn from_draft(draft: CourseDraft) -> Result<Course> {
        let missing: Vec<&str> = FIELD_NAMES
            .iter()
            .zip(draft.presence())
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Please provide {}.",
                join_names(&missing)
            )));
        }

        let start_date = parse_date(draft.start_date.as_deref().unwrap_or_default(), "startDate")?;
        let end_date = parse_date(draft.end_date.as_deref().unwrap_or_default(), "endDate")?;

        Ok(Course {
            title: required_text(draft.title, "title")?,
            description: required_text(draft.description, "description")?,
            category: required_text(draft.category, "category")?,
            instructor: required_text(draft.instructor, "instructor")?,
            start_date,
            end_date,
        })
    }

    fn check_patch(patch: &CourseDraft) -> Result<()> {
        if patch.presence().contains(&true) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "At least one field ({}) is required.",
                FIELD_NAMES.join(", ")
            )))
        }
    }

    fn merge(current: &Course, patch: CourseDraft) -> Result<Course> {
        Ok(Course {
            title: keep_or_replace(&current.title, patch.title),
            description: keep_or_replace(&current.description, patch.description),
            category: keep_or_replace(&current.category, patch.category),
            instructor: keep_or_replace(&current.instructor, patch.instructor),
            start_date: keep_or_parse(current.start_date, patch.start_date, "startDate")?,
            end_date: keep_or_parse(current.end_date, patch.end_date, "endDate")?,
        })
    }

    fn summarize(records: &[Record<Course>], _current_year: i32) -> CourseStats {
        let categories: HashSet<&str> = records.iter().map(|r| r.fields.category.as_str()).collect();
        let instructors: HashSet<&str> =
            records.iter().map(|r| r.fields.instructor.as_str()).collect();

        CourseStats {
            total_courses: records.len(),
            total_categories: categories.len(),
            total_instructors: instructors.len(),
        }
    }
}
