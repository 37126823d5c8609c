use serde::{Deserialize, Serialize};

use super::company::{Company, SegmentStrategy};
use super::contacts::{ArtifactFile, CompanyContacts};
use super::enriched::EnrichedCompany;

/// User-specified constraints for a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_range: Option<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_count: Option<u32>,
}

/// Pipeline stage a campaign has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStage {
    Discovery,
    Enrichment,
    Contacts,
    Completed,
}

/// The campaign aggregate: directive, filters, and the domain records each
/// pipeline stage produced. Owned and persisted by the UI collaborator; the
/// core reads it for prompt context and hands back replacements wholesale,
/// never patching one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub directive: String,
    #[serde(default)]
    pub filters: CampaignFilters,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub enriched_companies: Vec<EnrichedCompany>,
    #[serde(default)]
    pub contacts: Vec<CompanyContacts>,
    #[serde(default)]
    pub artifact_files: Vec<ArtifactFile>,
    pub stage: CampaignStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_contacts_found: Option<u64>,
    #[serde(default)]
    pub segmentation_strategy: Vec<SegmentStrategy>,
    #[serde(default)]
    pub duplicates_removed: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl Campaign {
    /// A fresh campaign with empty record sets, timestamped now.
    pub fn new(id: impl Into<String>, name: impl Into<String>, directive: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            name: name.into(),
            directive: directive.into(),
            filters: CampaignFilters::default(),
            companies: Vec::new(),
            enriched_companies: Vec::new(),
            contacts: Vec::new(),
            artifact_files: Vec::new(),
            stage: CampaignStage::Discovery,
            search_summary: None,
            enrichment_summary: None,
            contact_summary: None,
            total_contacts_found: None,
            segmentation_strategy: Vec::new(),
            duplicates_removed: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn target_count(&self) -> u32 {
        self.filters.target_count.unwrap_or(50)
    }
}
