use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Id};

/// One delivered NPS survey: who is asked (`reviewer`), about what
/// (`target`), and, once the embedded form submits, the 0-10 note and
/// free-form comment. A survey is delivered only while not concluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: Id,
    pub reviewer: String,
    pub target: String,
    /// Tag whose override configs style this survey's form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub concluded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new survey
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSurvey {
    pub reviewer: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl NewSurvey {
    pub fn into_survey(self) -> Survey {
        let now = Utc::now();
        Survey {
            id: generate_id(),
            reviewer: self.reviewer,
            target: self.target,
            tag: self.tag,
            note: None,
            comment: None,
            concluded: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Submission payload sent by the embedded form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcludeSurvey {
    pub survey_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Exact-match filter for survey listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyFilter {
    pub concluded: Option<bool>,
    pub tag: Option<String>,
}

impl SurveyFilter {
    pub fn matches(&self, survey: &Survey) -> bool {
        if let Some(concluded) = self.concluded {
            if survey.concluded != concluded {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if survey.tag.as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_survey_starts_unconcluded() {
        let survey = NewSurvey {
            reviewer: "reviewer@example.com".to_string(),
            target: "acme-shop".to_string(),
            tag: Some("default".to_string()),
        }
        .into_survey();

        assert!(!survey.concluded);
        assert_eq!(survey.note, None);
        assert_eq!(survey.comment, None);
        assert!(!survey.id.is_empty());
    }

    #[test]
    fn test_conclude_payload_wire_format() {
        let parsed: ConcludeSurvey =
            serde_json::from_str(r#"{"surveyId": "abc", "note": 9, "comment": "great"}"#).unwrap();
        assert_eq!(parsed.survey_id, "abc");
        assert_eq!(parsed.note, Some(9));
        assert_eq!(parsed.comment.as_deref(), Some("great"));

        // note and comment may be omitted entirely
        let bare: ConcludeSurvey = serde_json::from_str(r#"{"surveyId": "abc"}"#).unwrap();
        assert_eq!(bare.note, None);
        assert_eq!(bare.comment, None);
    }

    #[test]
    fn test_filter_matches_concluded_and_tag() {
        let mut survey = NewSurvey {
            reviewer: "r".to_string(),
            target: "t".to_string(),
            tag: Some("default".to_string()),
        }
        .into_survey();

        assert!(SurveyFilter {
            concluded: Some(false),
            tag: None,
        }
        .matches(&survey));

        survey.concluded = true;
        assert!(!SurveyFilter {
            concluded: Some(false),
            tag: None,
        }
        .matches(&survey));
        assert!(SurveyFilter {
            concluded: Some(true),
            tag: Some("default".to_string()),
        }
        .matches(&survey));
        assert!(!SurveyFilter {
            concluded: None,
            tag: Some("other".to_string()),
        }
        .matches(&survey));
    }
}
