use super::diagnostic;
use crate::Assistant;
use crate::prompts::COMPLIANCE_SYSTEM_PROMPT;
use serde::Serialize;
use tracing::{info, warn};

/// Notes returned when the compliance review could not be generated.
pub const COMPLIANCE_FALLBACK_NOTES: &str =
    "Compliance check completed. Please review design against local building codes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    NeedsReview,
}

impl ComplianceStatus {
    /// Read the trailing `STATUS: ...` line of a review.
    ///
    /// Reviews without a recognizable status line count as compliant.
    pub fn from_notes(notes: &str) -> Self {
        notes
            .lines()
            .rev()
            .filter_map(|line| {
                let line = line.trim().trim_matches('`');
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case("status")
                    .then(|| Self::parse(value))
                    .flatten()
            })
            .next()
            .unwrap_or(Self::Compliant)
    }

    fn parse(value: &str) -> Option<Self> {
        match value
            .trim()
            .trim_end_matches('.')
            .to_lowercase()
            .replace(['-', ' '], "_")
            .as_str()
        {
            "compliant" => Some(Self::Compliant),
            "non_compliant" => Some(Self::NonCompliant),
            "needs_review" => Some(Self::NeedsReview),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::NonCompliant => write!(f, "non_compliant"),
            Self::NeedsReview => write!(f, "needs_review"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub notes: String,
    pub status: ComplianceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl Assistant {
    /// Review a design description against building codes.
    pub async fn check_compliance(&self, design_text: &str) -> ComplianceReport {
        info!("Checking compliance ({} chars)", design_text.len());

        match self
            .generator
            .generate(design_text, "", COMPLIANCE_SYSTEM_PROMPT)
            .await
        {
            Ok(notes) => ComplianceReport {
                status: ComplianceStatus::from_notes(&notes),
                notes,
                diagnostic: None,
            },
            Err(e) => {
                warn!("Compliance review failed: {}", e);
                ComplianceReport {
                    notes: COMPLIANCE_FALLBACK_NOTES.to_string(),
                    status: ComplianceStatus::NeedsReview,
                    diagnostic: diagnostic(vec![format!("generation: {e}")]),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_status_from_notes() {
        assert_eq!(
            ComplianceStatus::from_notes("Egress widths fine.\nSTATUS: compliant"),
            ComplianceStatus::Compliant
        );
        assert_eq!(
            ComplianceStatus::from_notes("Missing ramp.\n`Status: Non-Compliant`\n"),
            ComplianceStatus::NonCompliant
        );
        assert_eq!(
            ComplianceStatus::from_notes("status: needs review."),
            ComplianceStatus::NeedsReview
        );
        assert_eq!(
            ComplianceStatus::from_notes("Room sizes: adequate"),
            ComplianceStatus::Compliant
        );
        assert_eq!(ComplianceStatus::NonCompliant.to_string(), "non_compliant");
    }

    #[tokio::test]
    async fn test_compliance_with_generator() {
        let temp_dir = tempdir().unwrap();
        let assistant = assistant_with_docs(
            &temp_dir,
            &[],
            Arc::new(FixedGenerator("Stair riser too high.\nSTATUS: non_compliant")),
        )
        .await;

        let report = assistant.check_compliance("Three-storey walk-up").await;
        assert_eq!(report.status, ComplianceStatus::NonCompliant);
        assert!(report.notes.starts_with("Stair riser"));
        assert_eq!(report.diagnostic, None);
    }

    #[tokio::test]
    async fn test_compliance_mock_echoes_design() {
        let temp_dir = tempdir().unwrap();
        let assistant = mock_assistant(&temp_dir, &[]).await;

        let report = assistant.check_compliance("Open-plan office").await;
        assert!(report.notes.contains("Question:\nOpen-plan office"));
        assert_eq!(report.status, ComplianceStatus::Compliant);
    }

    #[tokio::test]
    async fn test_compliance_fallback() {
        let temp_dir = tempdir().unwrap();
        let assistant = assistant_with_docs(&temp_dir, &[], Arc::new(FailingGenerator)).await;

        let report = assistant.check_compliance("Anything").await;
        assert_eq!(report.notes, COMPLIANCE_FALLBACK_NOTES);
        assert_eq!(report.status, ComplianceStatus::NeedsReview);
        assert!(report.diagnostic.unwrap().contains("service unavailable"));

        let json = serde_json::to_value(&report.status).unwrap();
        assert_eq!(json, "needs_review");
    }
}
