//! Domain records and the reserved-key tables that identify them.
//!
//! A value is treated as domain data only when it directly owns one of the
//! reserved keys; nested structure alone is never enough (that unwrap step
//! belongs to the locator).

pub mod campaign;
pub mod company;
pub mod contacts;
pub mod dedupe;
pub mod enriched;
pub mod keys;

pub use campaign::{Campaign, CampaignFilters, CampaignStage};
pub use company::{Company, SegmentStrategy};
pub use contacts::{ArtifactFile, CompanyContacts, Contact, OrganizationData};
pub use dedupe::{deduplicate_companies, normalize_company_name};
pub use enriched::{
    CSuiteChange, CompetitiveIntel, DialogueChallenge, EnrichedCompany, GrowthIndicator, NewsItem,
    Revenue, SalesNugget,
};
pub use keys::{has_domain_keys, has_target_keys, DOMAIN_KEYS, TARGET_KEYS};
