use serde_json::Value;

/// Keys that mark an object as being the domain payload itself rather than a
/// transport wrapper. Presence alone is enough: the normalizer must not
/// unwrap `message`/`result` out of an object that carries one of these.
pub const DOMAIN_KEYS: &[&str] = &[
    "companies",
    "enriched_companies",
    "company_contacts",
    "segmentation_strategy",
    "extracted_companies",
    "findings",
];

/// Superset of [`DOMAIN_KEYS`] used by the deep locator. Sub-agent payloads
/// carry per-workstream keys (revenue, news, ...) instead of a list key.
pub const TARGET_KEYS: &[&str] = &[
    "companies",
    "enriched_companies",
    "company_contacts",
    "segmentation_strategy",
    "extracted_companies",
    "findings",
    "revenue",
    "growth_indicators",
    "recent_news",
    "csuite_changes",
    "competitive_intel",
    "risk_insurance_challenges",
    "hr_workforce_challenges",
    "key_sales_nuggets",
];

/// True when `value` is an object directly owning any domain key.
/// Checks key presence only; a null value still counts.
pub fn has_domain_keys(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => DOMAIN_KEYS.iter().any(|k| map.contains_key(*k)),
        None => false,
    }
}

/// True when `value` is an object owning any target key with a non-null value.
pub fn has_target_keys(value: &Value) -> bool {
    match value.as_object() {
        Some(map) => TARGET_KEYS
            .iter()
            .any(|k| map.get(*k).map(|v| !v.is_null()).unwrap_or(false)),
        None => false,
    }
}
