use std::collections::HashMap;

use regex::Regex;

use super::company::Company;

/// Canonical form of a company name for duplicate detection: lowercase,
/// punctuation stripped, legal suffixes removed, whitespace collapsed.
pub fn normalize_company_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let punct = Regex::new(r"[^a-z0-9\s]").unwrap();
    let stripped = punct.replace_all(&lower, "");
    let suffix = Regex::new(
        r"\b(inc|corp|corporation|ltd|limited|llc|llp|co|company|group|holdings|plc|gmbh|ag|sa|pty|pvt|private)\b",
    )
    .unwrap();
    let no_suffix = suffix.replace_all(&stripped, "");
    let spaces = Regex::new(r"\s+").unwrap();
    spaces.replace_all(&no_suffix, " ").trim().to_string()
}

fn field_score(c: &Company) -> usize {
    [
        &c.industry,
        &c.hq_location,
        &c.estimated_size,
        &c.website,
        &c.relevance_reasoning,
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .count()
}

/// Deduplicate by normalized name, keeping whichever duplicate has more
/// populated fields. Names that normalize to nothing are dropped.
pub fn deduplicate_companies(companies: Vec<Company>) -> (Vec<Company>, usize) {
    let mut seen: HashMap<String, Company> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut removed = 0;

    for company in companies {
        let key = normalize_company_name(&company.name);
        if key.is_empty() {
            continue;
        }
        match seen.get(&key) {
            Some(existing) => {
                removed += 1;
                if field_score(&company) > field_score(existing) {
                    seen.insert(key, company);
                }
            }
            None => {
                order.push(key.clone());
                seen.insert(key, company);
            }
        }
    }

    let deduplicated = order
        .into_iter()
        .filter_map(|k| seen.remove(&k))
        .collect();
    (deduplicated, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, industry: &str, website: &str) -> Company {
        Company {
            name: name.into(),
            industry: industry.into(),
            hq_location: String::new(),
            estimated_size: String::new(),
            relevance_score: 0.0,
            relevance_reasoning: String::new(),
            website: website.into(),
            source_segment: None,
        }
    }

    #[test]
    fn test_normalize_strips_suffixes_and_punctuation() {
        assert_eq!(normalize_company_name("Acme, Inc."), "acme");
        assert_eq!(normalize_company_name("Globex Corporation"), "globex");
        assert_eq!(normalize_company_name("Wayne Holdings GmbH"), "wayne");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_company_name("  Stark   Industries  "), "stark industries");
    }

    #[test]
    fn test_dedupe_keeps_richer_record() {
        let sparse = company("Acme Inc", "", "");
        let rich = company("Acme", "Manufacturing", "acme.com");
        let (out, removed) = deduplicate_companies(vec![sparse, rich]);
        assert_eq!(removed, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].industry, "Manufacturing");
    }

    #[test]
    fn test_dedupe_prefers_first_on_tie() {
        let a = company("Acme", "Manufacturing", "");
        let b = company("Acme Inc", "Logistics", "");
        let (out, removed) = deduplicate_companies(vec![a, b]);
        assert_eq!(removed, 1);
        assert_eq!(out[0].industry, "Manufacturing");
    }

    #[test]
    fn test_dedupe_drops_empty_names() {
        let blank = company("  , Inc.", "", "");
        let (out, removed) = deduplicate_companies(vec![blank]);
        assert!(out.is_empty());
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_dedupe_preserves_first_seen_order() {
        let (out, _) = deduplicate_companies(vec![
            company("Globex", "", ""),
            company("Acme", "", ""),
            company("Globex Corp", "Energy", ""),
        ]);
        assert_eq!(out[0].name, "Globex Corp");
        assert_eq!(out[1].name, "Acme");
    }
}
