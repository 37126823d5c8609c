use serde_json::Value;

use crate::domain::enriched::map_array;
use crate::domain::{
    CSuiteChange, CompetitiveIntel, DialogueChallenge, EnrichedCompany, GrowthIndicator, NewsItem,
    Revenue, SalesNugget,
};

/// Merge the four sub-agent payloads into one composite record.
///
/// Each workstream owns a disjoint field set, so there is no conflict
/// resolution: financial-growth fills `revenue` + `growth_indicators`,
/// news-leadership fills `recent_news` + `csuite_changes`, competitive-intel
/// fills `competitive_intel`, risk-workforce fills the two dialogue matrices
/// and `key_sales_nuggets`. A missing or failed slot leaves its fields at the
/// documented empty defaults rather than omitting them.
///
/// Returns `None` when every slot is `None`: a record with no data at all is
/// not synthesized.
pub fn merge_slots(
    company_name: &str,
    financial: Option<&Value>,
    news: Option<&Value>,
    competitive: Option<&Value>,
    risk: Option<&Value>,
) -> Option<EnrichedCompany> {
    if financial.is_none() && news.is_none() && competitive.is_none() && risk.is_none() {
        return None;
    }

    let mut record = EnrichedCompany::empty(company_name);

    if let Some(v) = financial {
        record.revenue = v.get("revenue").map(Revenue::from_value).unwrap_or_default();
        record.growth_indicators = map_array(v, "growth_indicators", GrowthIndicator::from_value);
    }
    if let Some(v) = news {
        record.recent_news = map_array(v, "recent_news", NewsItem::from_value);
        record.csuite_changes = map_array(v, "csuite_changes", CSuiteChange::from_value);
    }
    if let Some(v) = competitive {
        record.competitive_intel = v
            .get("competitive_intel")
            .map(CompetitiveIntel::from_value)
            .unwrap_or_default();
    }
    if let Some(v) = risk {
        record.risk_insurance_challenges =
            map_array(v, "risk_insurance_challenges", DialogueChallenge::from_value);
        record.hr_workforce_challenges =
            map_array(v, "hr_workforce_challenges", DialogueChallenge::from_value);
        record.key_sales_nuggets = map_array(v, "key_sales_nuggets", SalesNugget::from_value);
    }

    Some(record)
}
