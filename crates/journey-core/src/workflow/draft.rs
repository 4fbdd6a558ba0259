//! Input validation for memory fields.

use crate::error::{Result, WorkflowError};
use chrono::{Datelike, NaiveDate};
use journey_store::{MemoryPatch, NewMemory, UserId};
use serde::Deserialize;

/// Unvalidated fields of a new memory, as submitted by a form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryDraft {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl MemoryDraft {
    /// Validate the draft into an insert payload owned by `owner`.
    pub fn validate(self, owner: UserId) -> Result<NewMemory> {
        Ok(NewMemory {
            title: required("title", &self.title)?,
            description: required("description", &self.description)?,
            date: parse_date(&self.date)?,
            location: optional(self.location),
            emoji: optional(self.emoji),
            user_id: owner,
        })
    }
}

/// Unvalidated field changes for an existing memory.
///
/// `None` leaves a field alone. A blank `location` or `emoji` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryPatchDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl MemoryPatchDraft {
    /// Reject changes that would blank a required field or carry a bad date.
    pub fn validate(self) -> Result<MemoryPatch> {
        Ok(MemoryPatch {
            title: self
                .title
                .map(|title| required("title", &title))
                .transpose()?,
            description: self
                .description
                .map(|description| required("description", &description))
                .transpose()?,
            date: self.date.map(|raw| parse_date(&raw)).transpose()?,
            location: self.location.map(|v| optional(Some(v))),
            emoji: self.emoji.map(|v| optional(Some(v))),
        })
    }
}

/// Parse a `YYYY-MM-DD` calendar date with a four-digit year.
///
/// Dates are stored as text and sorted lexically, so signed or five-digit
/// years are refused.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WorkflowError::Validation("date is required".to_string()));
    }
    let invalid = || WorkflowError::Validation(format!("date must be YYYY-MM-DD, got {raw:?}"));
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    if !(0..=9999).contains(&date.year()) {
        return Err(invalid());
    }
    Ok(date)
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text is stored as NULL.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> MemoryDraft {
        MemoryDraft {
            title: " Trip ".into(),
            description: "Fun".into(),
            date: "2024-01-01".into(),
            location: Some("Paris".into()),
            emoji: Some("  ".into()),
        }
    }

    #[test]
    fn test_valid_draft() {
        let memory = draft().validate(UserId::new("u1")).unwrap();
        assert_eq!(memory.title, "Trip");
        assert_eq!(memory.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(memory.location.as_deref(), Some("Paris"));
        assert_eq!(memory.emoji, None);
        assert_eq!(memory.user_id.as_str(), "u1");
    }

    #[test]
    fn test_required_fields() {
        for broken in [
            MemoryDraft {
                title: "".into(),
                ..draft()
            },
            MemoryDraft {
                description: "   ".into(),
                ..draft()
            },
            MemoryDraft {
                date: "".into(),
                ..draft()
            },
            MemoryDraft {
                date: "01/01/2024".into(),
                ..draft()
            },
        ] {
            let err = broken.validate(UserId::new("u1")).unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)), "{err:?}");
        }
    }

    #[test]
    fn test_patch_validation() {
        let patch = MemoryPatchDraft {
            title: Some("".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = MemoryPatchDraft {
            date: Some("not-a-date".into()),
            ..Default::default()
        };
        assert!(matches!(patch.validate(), Err(WorkflowError::Validation(_))));

        let patch = MemoryPatchDraft {
            date: Some("2024-02-29".into()),
            location: Some(" ".into()),
            emoji: Some("🎉".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(patch.location, Some(None));
        assert_eq!(patch.emoji, Some(Some("🎉".into())));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn test_date_year_must_sort_as_text() {
        assert!(parse_date("9999-12-31").is_ok());
        assert!(parse_date("0001-01-01").is_ok());
        for raw in ["+10000-01-01", "10000-01-01", "-0001-01-01"] {
            let err = parse_date(raw).unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)), "{raw}: {err:?}");
        }
    }
}
