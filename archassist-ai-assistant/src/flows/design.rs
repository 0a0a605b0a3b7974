use super::compliance::ComplianceStatus;
use super::diagnostic;
use crate::Assistant;
use crate::prompts::{DESIGN_SYSTEM_PROMPT, design_prompt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Concept model served until real model generation exists.
pub const MODEL_PLACEHOLDER_URL: &str = "/static/mock_model.glb";

/// Compliance notes used when the design itself could not be generated.
pub const DESIGN_FALLBACK_COMPLIANCE: &str = "Compliance check completed.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignRequest {
    /// Free-text design brief
    pub brief: String,
    /// Opaque sketch payload; only its presence changes the prompt
    #[serde(default)]
    pub sketch: Option<String>,
}

impl DesignRequest {
    pub fn new(brief: impl Into<String>) -> Self {
        Self {
            brief: brief.into(),
            sketch: None,
        }
    }

    pub fn with_sketch(mut self, sketch: impl Into<String>) -> Self {
        self.sketch = Some(sketch.into());
        self
    }

    fn has_sketch(&self) -> bool {
        self.sketch.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignResponse {
    pub design_concept_url: String,
    pub design_narrative: String,
    pub compliance_notes: String,
    pub compliance_status: ComplianceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl Assistant {
    /// Generate a design concept for a brief and review it for compliance.
    pub async fn design(&self, request: &DesignRequest) -> DesignResponse {
        let prompt = design_prompt(&request.brief, request.has_sketch());
        info!("Generating design (sketch: {})", request.has_sketch());

        let mut diagnostics = Vec::new();
        let context = self.grounding(&prompt, &mut diagnostics).await;

        match self
            .generator
            .generate(&prompt, &context, DESIGN_SYSTEM_PROMPT)
            .await
        {
            Ok(narrative) => {
                let report = self.check_compliance(&narrative).await;
                diagnostics.extend(report.diagnostic);
                DesignResponse {
                    design_concept_url: MODEL_PLACEHOLDER_URL.to_string(),
                    design_narrative: narrative,
                    compliance_notes: report.notes,
                    compliance_status: report.status,
                    diagnostic: diagnostic(diagnostics),
                }
            }
            Err(e) => {
                warn!("Design generation failed, returning fallback design: {}", e);
                diagnostics.push(format!("generation: {e}"));
                DesignResponse {
                    design_concept_url: MODEL_PLACEHOLDER_URL.to_string(),
                    design_narrative: format!("Design generated based on: {}", request.brief),
                    compliance_notes: DESIGN_FALLBACK_COMPLIANCE.to_string(),
                    compliance_status: ComplianceStatus::NeedsReview,
                    diagnostic: diagnostic(diagnostics),
                }
            }
        }
    }
}
