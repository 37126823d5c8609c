use serde_json::{json, Value};

use crate::client::{AgentCaller, CallOptions};
use crate::domain::{ArtifactFile, CompanyContacts, EnrichedCompany};
use crate::error::{AgentError, AgentResult};
use crate::locate::parse_agent_result;

use super::roster::AgentRoster;

/// Result of a contact-finding run.
#[derive(Debug, Clone, Default)]
pub struct ContactOutcome {
    pub contacts: Vec<CompanyContacts>,
    pub artifact_files: Vec<ArtifactFile>,
    pub total_contacts_found: u64,
    pub search_summary: String,
}

/// Find verified decision-maker contacts for the given enriched companies.
pub async fn run_contact_finder(
    caller: &dyn AgentCaller,
    roster: &AgentRoster,
    companies: &[EnrichedCompany],
) -> AgentResult<ContactOutcome> {
    if companies.is_empty() {
        return Ok(ContactOutcome::default());
    }

    let payload: Vec<Value> = companies
        .iter()
        .map(|c| json!({"company_name": c.company_name, "revenue": c.revenue.figure}))
        .collect();
    let message = format!(
        "Find verified decision-maker contacts for these companies: {}. Look for C-suite, VP, \
         and Director level contacts.",
        json!(payload)
    );

    let result = caller
        .call(&message, &roster.contact_finder, CallOptions::default())
        .await;
    if !result.success {
        return Err(AgentError::TaskFailed(result.error_message()));
    }

    let parsed = parse_agent_result(&result).ok_or_else(|| {
        AgentError::NoDomainData("Failed to parse contact results. Please try again.".to_string())
    })?;

    let contacts: Vec<CompanyContacts> = parsed
        .get("company_contacts")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().map(CompanyContacts::from_value).collect())
        .unwrap_or_default();

    let artifact_files = result
        .module_outputs
        .as_ref()
        .map(|m| m.artifact_files.clone())
        .unwrap_or_default();

    let total_contacts_found = parsed
        .get("total_contacts_found")
        .and_then(Value::as_u64)
        .unwrap_or_else(|| contacts.iter().map(|cc| cc.contacts.len() as u64).sum());

    let search_summary = parsed
        .get("search_summary")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    tracing::info!(
        companies = contacts.len(),
        total = total_contacts_found,
        "contact finding complete"
    );

    Ok(ContactOutcome {
        contacts,
        artifact_files,
        total_contacts_found,
        search_summary,
    })
}
