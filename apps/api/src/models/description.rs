//! The job-description payload and the fixed set of generated fields.
//!
//! `DescriptionField` is the single registry that ties together the JSON key the
//! review tool uses, the storage column, the export label and the prompt. Every
//! other module iterates `DescriptionField::ALL` instead of naming columns.

use serde::{Deserialize, Serialize};

/// Default vertical used when a profile is generated without one.
pub const DEFAULT_VERTICAL: &str = "General";

/// Which audience a field is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Internal,
    External,
}

/// One of the 16 generated description fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptionField {
    Purpose,
    Responsibilities,
    Manager,
    Travel,
    Physical,
    WorkConditions,
    MinQualifications,
    PreferredQualifications,
    MinEducation,
    PreferredEducation,
    MinExperience,
    Certifications,
    Competencies,
    WhatYoullDo,
    WhatWeLookFor,
    QualitiesThatStir,
}

impl DescriptionField {
    /// All fields in presentation order (internal first, then external).
    pub const ALL: [DescriptionField; 16] = [
        DescriptionField::Purpose,
        DescriptionField::Responsibilities,
        DescriptionField::Manager,
        DescriptionField::Travel,
        DescriptionField::Physical,
        DescriptionField::WorkConditions,
        DescriptionField::MinQualifications,
        DescriptionField::PreferredQualifications,
        DescriptionField::MinEducation,
        DescriptionField::PreferredEducation,
        DescriptionField::MinExperience,
        DescriptionField::Certifications,
        DescriptionField::Competencies,
        DescriptionField::WhatYoullDo,
        DescriptionField::WhatWeLookFor,
        DescriptionField::QualitiesThatStir,
    ];

    pub fn internal() -> impl Iterator<Item = DescriptionField> {
        Self::ALL
            .into_iter()
            .filter(|f| f.category() == Category::Internal)
    }

    pub fn external() -> impl Iterator<Item = DescriptionField> {
        Self::ALL
            .into_iter()
            .filter(|f| f.category() == Category::External)
    }

    pub fn category(self) -> Category {
        match self {
            DescriptionField::WhatYoullDo
            | DescriptionField::WhatWeLookFor
            | DescriptionField::QualitiesThatStir => Category::External,
            _ => Category::Internal,
        }
    }

    /// Key used in JSON bodies exchanged with the review tool.
    pub fn key(self) -> &'static str {
        match self {
            DescriptionField::Purpose => "purpose",
            DescriptionField::Responsibilities => "responsibilities",
            DescriptionField::Manager => "manager",
            DescriptionField::Travel => "travel",
            DescriptionField::Physical => "physical",
            DescriptionField::WorkConditions => "workconditions",
            DescriptionField::MinQualifications => "minqualifications",
            DescriptionField::PreferredQualifications => "preferredqualifications",
            DescriptionField::MinEducation => "mineducation",
            DescriptionField::PreferredEducation => "preferrededucation",
            DescriptionField::MinExperience => "minexperience",
            DescriptionField::Certifications => "certifications",
            DescriptionField::Competencies => "competencies",
            DescriptionField::WhatYoullDo => "whatYoullDo",
            DescriptionField::WhatWeLookFor => "whatWeLookFor",
            DescriptionField::QualitiesThatStir => "qualitiesThatStir",
        }
    }

    /// Storage column. The review table carries a parallel `saved_<column>`.
    pub fn column(self) -> &'static str {
        match self {
            DescriptionField::Purpose => "position_purpose",
            DescriptionField::Responsibilities => "key_responsibilities",
            DescriptionField::Manager => "direct_manager_direct_reports",
            DescriptionField::Travel => "travel_requirements",
            DescriptionField::Physical => "physical_requirements",
            DescriptionField::WorkConditions => "working_conditions",
            DescriptionField::MinQualifications => "minimum_qualifications",
            DescriptionField::PreferredQualifications => "preferred_qualifications",
            DescriptionField::MinEducation => "minimum_education",
            DescriptionField::PreferredEducation => "preferred_education",
            DescriptionField::MinExperience => "minimum_years_of_work_experience",
            DescriptionField::Certifications => "certifications",
            DescriptionField::Competencies => "competencies",
            DescriptionField::WhatYoullDo => "what_you_will_do",
            DescriptionField::WhatWeLookFor => "what_we_look_for",
            DescriptionField::QualitiesThatStir => "qualities_that_stir_our_souls",
        }
    }

    pub fn saved_column(self) -> String {
        format!("saved_{}", self.column())
    }

    /// Human-readable label used in the export document.
    pub fn label(self) -> &'static str {
        match self {
            DescriptionField::Purpose => "Purpose",
            DescriptionField::Responsibilities => "Key Responsibilities",
            DescriptionField::Manager => "Direct Manager/Reports",
            DescriptionField::Travel => "Travel Requirements",
            DescriptionField::Physical => "Physical Requirements",
            DescriptionField::WorkConditions => "Working Conditions",
            DescriptionField::MinQualifications => "Minimum Qualifications",
            DescriptionField::PreferredQualifications => "Preferred Qualifications",
            DescriptionField::MinEducation => "Minimum Education",
            DescriptionField::PreferredEducation => "Preferred Education",
            DescriptionField::MinExperience => "Minimum Experience",
            DescriptionField::Certifications => "Certifications",
            DescriptionField::Competencies => "Competencies",
            DescriptionField::WhatYoullDo => "What You'll Do",
            DescriptionField::WhatWeLookFor => "What We Look For",
            DescriptionField::QualitiesThatStir => "Qualities That Stir Our Souls",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire payload
// ────────────────────────────────────────────────────────────────────────────

/// HR-facing structured fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalSection {
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub responsibilities: Option<String>,
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub travel: Option<String>,
    #[serde(default)]
    pub physical: Option<String>,
    #[serde(default)]
    pub workconditions: Option<String>,
    #[serde(default)]
    pub minqualifications: Option<String>,
    #[serde(default)]
    pub preferredqualifications: Option<String>,
    #[serde(default)]
    pub mineducation: Option<String>,
    #[serde(default)]
    pub preferrededucation: Option<String>,
    #[serde(default)]
    pub minexperience: Option<String>,
    #[serde(default)]
    pub certifications: Option<String>,
    #[serde(default)]
    pub competencies: Option<String>,
}

/// Candidate-facing narrative fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSection {
    #[serde(default)]
    pub what_youll_do: Option<String>,
    #[serde(default)]
    pub what_we_look_for: Option<String>,
    #[serde(default)]
    pub qualities_that_stir: Option<String>,
}

/// A complete description as exchanged with the review tool and persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptionPayload {
    #[serde(default)]
    pub vertical: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub subdivision: Option<String>,
    pub internal: InternalSection,
    pub external: ExternalSection,
}

impl DescriptionPayload {
    /// Empty payload labelled with a vertical and its derived division labels.
    pub fn for_vertical(vertical: &str) -> Self {
        Self {
            vertical: Some(vertical.to_string()),
            division: Some(format!("{vertical} Division")),
            subdivision: Some(format!("{vertical} Subdivision")),
            ..Default::default()
        }
    }

    pub fn get(&self, field: DescriptionField) -> Option<&str> {
        let (i, e) = (&self.internal, &self.external);
        let value = match field {
            DescriptionField::Purpose => &i.purpose,
            DescriptionField::Responsibilities => &i.responsibilities,
            DescriptionField::Manager => &i.manager,
            DescriptionField::Travel => &i.travel,
            DescriptionField::Physical => &i.physical,
            DescriptionField::WorkConditions => &i.workconditions,
            DescriptionField::MinQualifications => &i.minqualifications,
            DescriptionField::PreferredQualifications => &i.preferredqualifications,
            DescriptionField::MinEducation => &i.mineducation,
            DescriptionField::PreferredEducation => &i.preferrededucation,
            DescriptionField::MinExperience => &i.minexperience,
            DescriptionField::Certifications => &i.certifications,
            DescriptionField::Competencies => &i.competencies,
            DescriptionField::WhatYoullDo => &e.what_youll_do,
            DescriptionField::WhatWeLookFor => &e.what_we_look_for,
            DescriptionField::QualitiesThatStir => &e.qualities_that_stir,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: DescriptionField, value: Option<String>) {
        let (i, e) = (&mut self.internal, &mut self.external);
        let slot = match field {
            DescriptionField::Purpose => &mut i.purpose,
            DescriptionField::Responsibilities => &mut i.responsibilities,
            DescriptionField::Manager => &mut i.manager,
            DescriptionField::Travel => &mut i.travel,
            DescriptionField::Physical => &mut i.physical,
            DescriptionField::WorkConditions => &mut i.workconditions,
            DescriptionField::MinQualifications => &mut i.minqualifications,
            DescriptionField::PreferredQualifications => &mut i.preferredqualifications,
            DescriptionField::MinEducation => &mut i.mineducation,
            DescriptionField::PreferredEducation => &mut i.preferrededucation,
            DescriptionField::MinExperience => &mut i.minexperience,
            DescriptionField::Certifications => &mut i.certifications,
            DescriptionField::Competencies => &mut i.competencies,
            DescriptionField::WhatYoullDo => &mut e.what_youll_do,
            DescriptionField::WhatWeLookFor => &mut e.what_we_look_for,
            DescriptionField::QualitiesThatStir => &mut e.qualities_that_stir,
        };
        *slot = value;
    }
}
