use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A verified decision-maker contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub seniority: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_status: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin_url: String,
}

impl Contact {
    pub fn from_value(v: &Value) -> Self {
        let s = |key: &str| -> String {
            v.get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        Self {
            full_name: s("full_name"),
            title: s("title"),
            seniority: s("seniority"),
            email: s("email"),
            email_status: s("email_status"),
            phone: s("phone"),
            linkedin_url: s("linkedin_url"),
        }
    }
}

/// Organization metadata from the contact-data provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationData {
    #[serde(default)]
    pub apollo_id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub employee_count: String,
    #[serde(default)]
    pub industry: String,
}

impl OrganizationData {
    pub fn from_value(v: &Value) -> Self {
        let s = |key: &str| -> String {
            v.get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        Self {
            apollo_id: s("apollo_id"),
            domain: s("domain"),
            employee_count: s("employee_count"),
            industry: s("industry"),
        }
    }
}

/// All contacts found for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyContacts {
    pub company_name: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub organization_data: OrganizationData,
}

impl CompanyContacts {
    pub fn from_value(v: &Value) -> Self {
        Self {
            company_name: v
                .get("company_name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            contacts: v
                .get("contacts")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().map(Contact::from_value).collect())
                .unwrap_or_default(),
            organization_data: v
                .get("organization_data")
                .map(OrganizationData::from_value)
                .unwrap_or_default(),
        }
    }
}

/// A downloadable artifact produced by an agent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFile {
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub format_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_contacts_from_value() {
        let cc = CompanyContacts::from_value(&json!({
            "company_name": "Acme",
            "contacts": [
                {"full_name": "Pat Lee", "title": "VP Finance", "seniority": "vp",
                 "email": "pat@acme.com", "email_status": "verified"}
            ],
            "organization_data": {"apollo_id": "a1", "domain": "acme.com",
                                   "employee_count": "800", "industry": "Manufacturing"}
        }));
        assert_eq!(cc.contacts.len(), 1);
        assert_eq!(cc.contacts[0].full_name, "Pat Lee");
        assert_eq!(cc.contacts[0].phone, "");
        assert_eq!(cc.organization_data.domain, "acme.com");
    }

    #[test]
    fn test_missing_sections_default() {
        let cc = CompanyContacts::from_value(&json!({"company_name": "Globex"}));
        assert!(cc.contacts.is_empty());
        assert_eq!(cc.organization_data, OrganizationData::default());
    }
}
