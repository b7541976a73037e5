// All prompt templates for description generation.
// Placeholders are `{name}` tokens, filled in a single pass by `fill`.

use crate::models::description::DescriptionField;

/// Placeholder for the profile title in per-field templates.
pub const TITLE_PLACEHOLDER: &str = "{job_title}";

/// Replaces each `{name}` token of `template` whose name appears in `values`.
/// Substituted text is never scanned again, and unknown tokens stay as written.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Per-field template. Every template mentions the title; only some use the vertical.
pub fn field_template(field: DescriptionField) -> &'static str {
    match field {
        DescriptionField::Purpose => "Craft a formal, three-sentence 'Position Purpose' paragraph for the {job_title} role. \
            Maintain a professional, formal, and outcome-driven tone appropriate for a Fortune 50 job description.",
        DescriptionField::Responsibilities => "Generate 6-8 clear, action-driven bullet points for 'Key Responsibilities' for the {job_title} role. \
            Use professional, results-focused language appropriate for a Fortune 50 company.",
        DescriptionField::Manager => "Create a brief, formal description for 'Direct Manager/Direct Reports' for the {job_title}. \
            Indicate reporting structure and whether there are direct reports.",
        DescriptionField::Travel => "Write a formal, one-sentence 'Travel Requirements' statement for the {job_title}.",
        DescriptionField::Physical => "Generate an ADA-compliant 'Physical Requirements' paragraph for the {job_title}. \
            Include standard office-based expectations.",
        DescriptionField::WorkConditions => "Craft a professional 'Working Conditions' paragraph for the {job_title}, \
            describing environment and pace.",
        DescriptionField::MinQualifications => "Create a formal 'Minimum Qualifications' list for the {job_title}, \
            listing required skills and experience.",
        DescriptionField::PreferredQualifications => "Generate a 'Preferred Qualifications' list for the {job_title}, \
            listing additional desirable skills and experiences.",
        DescriptionField::MinEducation => "Write a concise statement for 'Minimum Education' required for the {job_title}.",
        DescriptionField::PreferredEducation => "Draft a short, formal sentence for 'Preferred Education' for the {job_title}.",
        DescriptionField::MinExperience => "State the 'Minimum Years of Work Experience' required for the {job_title} role.",
        DescriptionField::Certifications => "List any 'Certifications' required or preferred for the {job_title} in the {vertical}.",
        DescriptionField::Competencies => "Generate a list of 6-8 professional 'Competencies' for the {job_title}.",
        DescriptionField::WhatYoullDo => "Write a brief, compelling 2-3 sentence paragraph summarizing key tasks and responsibilities of the {job_title}. \
            Also add a section below titled 'Duties' and generate 6-8 action-driven bullet points.",
        DescriptionField::WhatWeLookFor => "Draft a professional 'What We Look For' section with 6 to 8 bullets highlighting \
            the core attributes and skills desired in candidates for the {job_title}.",
        DescriptionField::QualitiesThatStir => "Create a professional yet inspiring section with 4 bullets listing \
            \"nice to have\" skills and personal qualities for the {job_title}.",
    }
}

pub fn render_field_prompt(field: DescriptionField, job_title: &str, vertical: &str) -> String {
    fill(
        field_template(field),
        &[("job_title", job_title), ("vertical", vertical)],
    )
}

const INTERNAL_FORMAT: &str = "Desired format:
     Position Purpose:
     Key Responsibilities:
     Direct Manager/Direct Reports:
     Travel Requirements:
     Physical Requirements:
     Working Conditions:
     Minimum Qualifications:
     Preferred Qualifications:
     Minimum Education:
     Preferred Education:
     Minimum Years of Work Experience:
     Certifications:
     Competencies:";

/// Reformat two existing source passages. Replace `{desc_1}`, `{desc_2}`, `{format}`.
pub const WITH_SOURCES_TEMPLATE: &str = "Reformat the following two Job descriptions into Desired format:

{desc_1}
{desc_2}

{format}";

/// Draft from title and vertical alone. Replace `{job_profile}`, `{vertical}`, `{format}`.
pub const FALLBACK_TEMPLATE: &str =
    "generate Job description for {job_profile} in a {vertical} distribution company in the desired format below:

{format}";

/// Whole-document prompt reformatting two source passages into the internal layout.
pub fn render_sources_prompt(desc_1: &str, desc_2: &str) -> String {
    fill(
        WITH_SOURCES_TEMPLATE,
        &[("desc_1", desc_1), ("desc_2", desc_2), ("format", INTERNAL_FORMAT)],
    )
}

/// Whole-document prompt drafting the internal layout from a title and vertical.
pub fn render_fallback_prompt(job_profile: &str, vertical: &str) -> String {
    fill(
        FALLBACK_TEMPLATE,
        &[
            ("job_profile", job_profile),
            ("vertical", vertical),
            ("format", INTERNAL_FORMAT),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_template_mentions_the_title() {
        for field in DescriptionField::ALL {
            assert!(
                field_template(field).contains(TITLE_PLACEHOLDER),
                "{field:?} template has no title placeholder"
            );
        }
    }

    #[test]
    fn test_render_field_prompt_leaves_no_placeholders() {
        for field in DescriptionField::ALL {
            let prompt = render_field_prompt(field, "Senior Data Analyst", "Healthcare");
            assert!(prompt.contains("Senior Data Analyst"));
            assert!(!prompt.contains('{'), "{field:?}: {prompt}");
        }
    }

    #[test]
    fn test_certifications_prompt_includes_vertical() {
        let prompt = render_field_prompt(DescriptionField::Certifications, "Buyer", "Food Service");
        assert!(prompt.contains("in the Food Service"));
    }

    #[test]
    fn test_sources_prompt_embeds_both_passages() {
        let prompt = render_sources_prompt("Job description: first", "Job description: second");
        assert!(prompt.contains("Job description: first\nJob description: second"));
        assert!(prompt.contains("Minimum Years of Work Experience:"));
    }

    #[test]
    fn test_fallback_prompt_uses_profile_and_vertical() {
        let prompt = render_fallback_prompt("Forklift Operator", "Foodservice");
        assert!(prompt.starts_with(
            "generate Job description for Forklift Operator in a Foodservice distribution company"
        ));
        assert!(prompt.ends_with("Competencies:"));
    }

    #[test]
    fn test_fill_leaves_unknown_and_unclosed_braces() {
        assert_eq!(fill("{a} {b} {a", &[("a", "x")]), "x {b} {a");
    }

    #[test]
    fn test_sources_prompt_keeps_placeholder_text_in_passages() {
        let prompt = render_sources_prompt("Job description: uses {desc_2} literally", "Job description: SECOND");
        assert!(prompt.contains("Job description: uses {desc_2} literally\nJob description: SECOND"));
        assert_eq!(prompt.matches("SECOND").count(), 1);
        assert!(!prompt.contains("{format}"));
    }

    #[test]
    fn test_fallback_prompt_keeps_braces_in_title() {
        let prompt = render_fallback_prompt("Ops {vertical} Lead", "Foodservice");
        assert!(prompt.starts_with(
            "generate Job description for Ops {vertical} Lead in a Foodservice distribution company"
        ));
        let prompt = render_fallback_prompt("Buyer", "{format}");
        assert!(prompt.contains("in a {format} distribution company"));
    }

    #[test]
    fn test_field_prompt_keeps_braces_in_title() {
        let prompt = render_field_prompt(DescriptionField::Certifications, "Chef {vertical}", "Healthcare");
        assert!(prompt.contains("for the Chef {vertical} in the Healthcare."));
    }
}
