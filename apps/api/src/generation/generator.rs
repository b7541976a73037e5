//! Description generation: one completion call per field, assembled into a payload.
//!
//! Calls are sequential. A failed call leaves an `"Error: ..."` sentinel in that
//! field only; the remaining fields are still generated.

use tracing::{debug, info, warn};

use crate::generation::prompts::{
    render_fallback_prompt, render_field_prompt, render_sources_prompt,
};
use crate::llm_client::{is_error_sentinel, TextCompleter};
use crate::models::description::{DescriptionField, DescriptionPayload, DEFAULT_VERTICAL};

/// Generates all 16 fields for a profile title.
///
/// `vertical` falls back to `DEFAULT_VERTICAL` when absent or blank. The result
/// is never persisted here.
pub async fn generate_description(
    llm: &dyn TextCompleter,
    job_title: &str,
    vertical: Option<&str>,
) -> DescriptionPayload {
    let vertical = vertical
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VERTICAL);

    info!("Generating description for '{job_title}' (vertical: {vertical})");

    let mut payload = DescriptionPayload::for_vertical(vertical);
    let mut failed = 0usize;

    for field in DescriptionField::ALL {
        let prompt = render_field_prompt(field, job_title, vertical);
        let text = llm.complete(&prompt).await;

        if is_error_sentinel(&text) {
            failed += 1;
            warn!("Field '{}' failed for '{job_title}': {text}", field.key());
        } else {
            debug!("Field '{}' generated ({} chars)", field.key(), text.len());
        }

        payload.set(field, Some(text));
    }

    if failed > 0 {
        warn!(
            "Generated '{job_title}' with {failed}/{} failed fields",
            DescriptionField::ALL.len()
        );
    }

    payload
}

/// Where a whole-document draft comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSource {
    /// Two existing passages to reformat. Either may be empty, not both.
    Sources { desc_1: String, desc_2: String },
    /// Nothing to reformat: draft from the title and vertical.
    TitleAndVertical { job_profile: String, vertical: String },
}

/// Drafts a single internal-layout document from existing source material,
/// or from the title and vertical when there is none.
pub async fn generate_document(llm: &dyn TextCompleter, source: &DraftSource) -> String {
    let prompt = match source {
        DraftSource::Sources { desc_1, desc_2 } => render_sources_prompt(desc_1, desc_2),
        DraftSource::TitleAndVertical {
            job_profile,
            vertical,
        } => render_fallback_prompt(job_profile, vertical),
    };

    let text = llm.complete(&prompt).await;
    if is_error_sentinel(&text) {
        warn!("Document draft failed: {text}");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedCompleter;

    #[tokio::test]
    async fn test_generates_every_field_with_one_call_each() {
        let llm = ScriptedCompleter::constant("drafted");
        let payload = generate_description(&llm, "Senior Data Analyst", Some("Healthcare")).await;

        assert_eq!(llm.calls(), 16);
        for field in DescriptionField::ALL {
            assert_eq!(payload.get(field), Some("drafted"), "{field:?}");
        }
        assert_eq!(payload.vertical.as_deref(), Some("Healthcare"));
        assert_eq!(payload.division.as_deref(), Some("Healthcare Division"));
        assert_eq!(payload.subdivision.as_deref(), Some("Healthcare Subdivision"));
    }

    #[tokio::test]
    async fn test_prompts_follow_field_order_and_carry_title() {
        let llm = ScriptedCompleter::constant("x");
        generate_description(&llm, "Buyer", None).await;

        let prompts = llm.prompts();
        assert!(prompts[0].contains("'Position Purpose'"));
        assert!(prompts[15].contains("\"nice to have\""));
        assert!(prompts.iter().all(|p| p.contains("Buyer")));
    }

    #[tokio::test]
    async fn test_missing_or_blank_vertical_defaults_to_general() {
        let llm = ScriptedCompleter::constant("x");
        let payload = generate_description(&llm, "Buyer", Some("  ")).await;
        assert_eq!(payload.vertical.as_deref(), Some("General"));
        assert!(llm.prompts()[11].ends_with("in the General."));
    }

    #[tokio::test]
    async fn test_failed_field_keeps_sentinel_and_others_continue() {
        let llm = ScriptedCompleter::new(|prompt| {
            if prompt.contains("'Travel Requirements'") {
                "Error: upstream timeout".to_string()
            } else {
                "ok".to_string()
            }
        });
        let payload = generate_description(&llm, "Buyer", None).await;

        assert_eq!(llm.calls(), 16);
        assert_eq!(
            payload.get(DescriptionField::Travel),
            Some("Error: upstream timeout")
        );
        assert_eq!(payload.get(DescriptionField::Physical), Some("ok"));
        assert_eq!(payload.get(DescriptionField::QualitiesThatStir), Some("ok"));
    }

    #[tokio::test]
    async fn test_two_generations_call_the_provider_twice() {
        let llm = ScriptedCompleter::constant("x");
        generate_description(&llm, "Buyer", None).await;
        generate_description(&llm, "Buyer", None).await;
        assert_eq!(llm.calls(), 32);
    }

    #[tokio::test]
    async fn test_document_from_sources_uses_reformat_prompt() {
        let llm = ScriptedCompleter::constant("doc");
        let source = DraftSource::Sources {
            desc_1: "Job description: picks orders".to_string(),
            desc_2: String::new(),
        };
        assert_eq!(generate_document(&llm, &source).await, "doc");
        assert!(llm.prompts()[0].starts_with("Reformat the following two Job descriptions"));
    }

    #[tokio::test]
    async fn test_document_fallback_uses_title_and_vertical() {
        let llm = ScriptedCompleter::constant("doc");
        let source = DraftSource::TitleAndVertical {
            job_profile: "Driver".to_string(),
            vertical: "Foodservice".to_string(),
        };
        generate_document(&llm, &source).await;
        assert!(llm.prompts()[0]
            .starts_with("generate Job description for Driver in a Foodservice distribution company"));
    }
}
