use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A reported issue, as submitted to and listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub location: String,
    pub description: String,
}

/// Issue fields as entered by the user, before validation.
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub title: String,
    pub location: String,
    pub description: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

impl IssueDraft {
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            description: description.into(),
        }
    }

    /// Trim every field and reject the draft if any of them ends up empty.
    pub fn validate(&self) -> Result<Issue, DraftError> {
        let title = self.title.trim();
        let location = self.location.trim();
        let description = self.description.trim();

        for (name, value) in [
            ("Title", title),
            ("Location", location),
            ("Description", description),
        ] {
            if value.is_empty() {
                return Err(DraftError::EmptyField(name));
            }
        }

        Ok(Issue {
            title: title.to_string(),
            location: location.to_string(),
            description: description.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_fields() {
        let draft = IssueDraft::new("  Pothole ", "Main St\n", "\tDeep one");
        let issue = draft.validate().unwrap();
        assert_eq!(issue.title, "Pothole");
        assert_eq!(issue.location, "Main St");
        assert_eq!(issue.description, "Deep one");
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert_eq!(
            IssueDraft::new("", "Main St", "Deep").validate(),
            Err(DraftError::EmptyField("Title"))
        );
        assert_eq!(
            IssueDraft::new("Pothole", "   ", "Deep").validate(),
            Err(DraftError::EmptyField("Location"))
        );
        assert_eq!(
            IssueDraft::new("Pothole", "Main St", "").validate(),
            Err(DraftError::EmptyField("Description"))
        );
    }

    #[test]
    fn test_issue_list_parses() {
        let json = r#"[{"title":"Pothole","location":"Main St","description":"Deep","id":7}]"#;
        let issues: Vec<Issue> = serde_json::from_str(json).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "Main St");
    }
}
