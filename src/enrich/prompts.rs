//! Prompt builders for the four enrichment sub-agent workstreams.
//!
//! All four share a company-context preamble carrying the campaign directive,
//! the research timeframe, and the source-validation rules; each workstream
//! then pins its own output contract so the payloads land on disjoint fields.

use chrono::{Duration, Utc};

use crate::domain::{Campaign, Company};

/// Shared preamble: who the company is, what the campaign wants, and how
/// sources must be validated and dated.
pub fn build_company_context(company: &Company, campaign: &Campaign) -> String {
    let today = Utc::now().date_naive();
    let window_start = (Utc::now() - Duration::days(365)).date_naive();
    let industry = if company.industry.is_empty() {
        "technology"
    } else {
        company.industry.as_str()
    };

    let mut context = format!(
        "TODAY'S DATE: {today}\n\
         RESEARCH TIMEFRAME: Focus on events, data, and developments from the last 12 months \
         (since {window_start}). Prioritize the most recent information available.\n\n\
         Company: \"{}\" - a {industry} company",
        company.name
    );
    if !company.hq_location.is_empty() {
        context.push_str(&format!(" headquartered in {}", company.hq_location));
    }
    if !company.estimated_size.is_empty() {
        context.push_str(&format!(
            " with approximately {} employees",
            company.estimated_size
        ));
    }
    context.push_str(".\n");

    let directive = if campaign.directive.is_empty() {
        format!("Research {industry} companies")
    } else {
        campaign.directive.clone()
    };
    context.push_str(&format!("CAMPAIGN CONTEXT: {directive}\n"));
    if let Some(geo) = &campaign.filters.geography {
        context.push_str(&format!("TARGET GEOGRAPHY: {geo}\n"));
    }
    if !campaign.filters.industries.is_empty() {
        context.push_str(&format!(
            "TARGET INDUSTRIES: {}\n",
            campaign.filters.industries.join(", ")
        ));
    }
    if let Some(segment) = &company.source_segment {
        context.push_str(&format!("DISCOVERY SEGMENT: {segment}\n"));
    }
    if !company.website.is_empty() {
        context.push_str(&format!("COMPANY WEBSITE: {}\n", company.website));
    }

    context.push_str(
        "\nSOURCE VALIDATION RULES:\n\
         - Tier 1 (Highest): Official SEC filings, annual reports, press releases from the company itself\n\
         - Tier 2: Reputable business news (Reuters, Bloomberg, WSJ, TechCrunch, industry publications)\n\
         - Tier 3: Industry analyst reports (Gartner, Forrester, IDC, CB Insights)\n\
         - Tier 4: Verified databases (Crunchbase, PitchBook, LinkedIn, Glassdoor)\n\
         - EXCLUDE: Wikipedia, unattributed blog posts, outdated sources (>18 months old unless \
         historically significant), social media rumors\n\
         - Every data point MUST include its source and date. If a date cannot be determined, mark it \
         as \"Date unknown\".\n\
         - Flag any data older than 12 months with \"(Historical)\" prefix.",
    );
    context
}

/// Workstream 1: revenue position and growth indicators.
pub fn build_financial_growth_prompt(company: &Company, campaign: &Campaign) -> String {
    format!(
        "{context}\n\n\
         ROLE: You are a senior financial research analyst specializing in company intelligence \
         for B2B sales teams. Your research must be precise, sourced, and actionable.\n\n\
         Research FINANCIAL & GROWTH data for \"{name}\":\n\n\
         1. REVENUE & FINANCIAL POSITION\n\
         - Annual revenue, ARR, or estimated revenue with fiscal year and source\n\
         - Recent funding rounds: amount, lead investors, valuation, date\n\
         - Distinguish confirmed revenue (filings/press) from estimates (databases/analysts)\n\
         - If no reliable revenue data exists, state \"Revenue undisclosed\" rather than guessing\n\n\
         2. GROWTH INDICATORS (last 12 months only)\n\
         - Hiring surges, office or geographic expansion, product launches, market expansion, M&A\n\
         - For each indicator, explain the SALES IMPLICATION: what does this signal mean for \
         someone selling to this company?\n\
         - Indicators must reference specific, verifiable events, not generic industry trends\n\n\
         Return a JSON object with these fields:\n\
         - \"company_name\": string\n\
         - \"revenue\": {{ \"figure\": string, \"year\": string, \"source\": string }}\n\
         - \"growth_indicators\": [{{ \"type\": string, \"detail\": string, \"implications\": string }}]",
        context = build_company_context(company, campaign),
        name = company.name
    )
}

/// Workstream 2: recent news and leadership changes.
pub fn build_news_leadership_prompt(company: &Company, campaign: &Campaign) -> String {
    let today = Utc::now().date_naive();
    format!(
        "{context}\n\n\
         ROLE: You are a senior business intelligence analyst specializing in corporate news \
         monitoring and leadership tracking for B2B sales teams.\n\n\
         Research NEWS & LEADERSHIP data for \"{name}\":\n\n\
         1. RECENT NEWS & DEVELOPMENTS (last 12 months, prioritize last 6 months)\n\
         Search for the MOST RECENT news available up to {today}: press releases, product launches, \
         partnerships, acquisitions, regulatory actions, awards, earnings milestones.\n\
         For EACH item include the exact publication date (YYYY-MM-DD), the source publication, and \
         assess sales_relevance: why does this matter to someone selling B2B services to this \
         company? Do NOT fabricate recent dates for old news; if the company has little recent news, \
         say so rather than padding.\n\n\
         2. C-SUITE & LEADERSHIP CHANGES (last 18 months)\n\
         New hires at VP level and above, departures, promotions, board appointments: name, new role, \
         previous role, date. New executives typically review vendor relationships within their first \
         90 days; flag changes in the last 6 months as \"Active Review Window\".\n\n\
         Return a JSON object with these fields:\n\
         - \"company_name\": string\n\
         - \"recent_news\": [{{ \"date\": string, \"headline\": string, \"summary\": string, \
         \"sales_relevance\": string }}]\n\
         - \"csuite_changes\": [{{ \"name\": string, \"new_role\": string, \"previous_role\": string, \
         \"date\": string }}]",
        context = build_company_context(company, campaign),
        name = company.name
    )
}

/// Workstream 3: vendor, partner, and competitor mapping.
pub fn build_competitive_intel_prompt(company: &Company, campaign: &Campaign) -> String {
    format!(
        "{context}\n\n\
         ROLE: You are a competitive intelligence analyst specializing in technology ecosystem \
         mapping and market positioning analysis for B2B sales teams.\n\n\
         Research COMPETITIVE & MARKET INTELLIGENCE for \"{name}\":\n\n\
         1. TECHNOLOGY VENDORS & PLATFORMS: cloud infrastructure, enterprise software, development \
         tools, security, data platforms. Sources: job postings, case studies, press releases, \
         partnership announcements.\n\
         2. STRATEGIC PARTNERS: consulting firms, system integrators, channel partners, technology \
         alliances, joint ventures.\n\
         3. DIRECT COMPETITORS: companies competing for the same customers, including emerging \
         disruptors and competitors the company has explicitly named. Only include VERIFIED \
         competitive relationships, not generic industry players.\n\n\
         Each vendor/partner/competitor must be a SPECIFIC named company, not a category. If \
         intelligence is limited, return shorter but accurate lists rather than padding with guesses.\n\n\
         Return a JSON object with these fields:\n\
         - \"company_name\": string\n\
         - \"competitive_intel\": {{ \"vendors\": [string], \"partners\": [string], \
         \"competitors\": [string] }}",
        context = build_company_context(company, campaign),
        name = company.name
    )
}

/// Workstream 4: risk/insurance and HR/workforce dialogue matrices plus
/// synthesized sales nuggets.
pub fn build_risk_workforce_prompt(company: &Company, campaign: &Campaign) -> String {
    format!(
        "{context}\n\n\
         ROLE: You are a senior risk & workforce analyst specializing in identifying actionable \
         business challenges and sales opportunities for B2B advisory services. You synthesize \
         intelligence into a \"Strategic Dialogue Matrix\" format.\n\n\
         Research RISK, INSURANCE, HR & WORKFORCE challenges for \"{name}\", plus synthesize KEY \
         SALES NUGGETS:\n\n\
         1. STRATEGIC RISK DIALOGUE MATRIX\n\
         Identify risk & insurance challenges tied to REAL company events: cyber exposure, D&O \
         liability, expansion compliance, supply chain concentration, ESG obligations, E&O, \
         property & casualty. For each: the specific challenge, the verifiable trigger event with \
         date, urgency (High | Medium | Low), the type of advisory service that addresses it, and \
         a specific non-salesy conversation opener.\n\n\
         2. STRATEGIC BENEFITS & WORKFORCE DIALOGUE MATRIX\n\
         Identify HR & workforce challenges tied to REAL company events: talent acquisition and \
         retention, executive compensation, benefits program gaps, workforce planning, remote/hybrid \
         policy. Same fields as above.\n\n\
         3. KEY SALES NUGGETS\n\
         Synthesize the MOST compelling conversation starters. Each must reference a specific \
         verifiable event, connect it to a likely business need, and provide a natural talking \
         point. Category: \"Leadership Change\", \"Funding\", \"Expansion\", \"Regulatory\", \
         \"Competitive Shift\", \"Market Signal\", or \"Workforce\".\n\n\
         QUALITY REQUIREMENTS:\n\
         - Every trigger_event must reference a REAL, verifiable event with an approximate date\n\
         - If you cannot find real trigger events for a category, omit it rather than fabricate\n\
         - Conversation openers must be specific to THIS company\n\n\
         Return a JSON object with these fields:\n\
         - \"company_name\": string\n\
         - \"risk_insurance_challenges\": [{{ \"challenge\": string, \"trigger_event\": string, \
         \"urgency\": \"High\"|\"Medium\"|\"Low\", \"relevant_service\": string, \
         \"service_provider\": \"\", \"conversation_opener\": string }}]\n\
         - \"hr_workforce_challenges\": [{{ same fields }}]\n\
         - \"key_sales_nuggets\": [{{ \"nugget\": string, \"category\": string, \"source\": string, \
         \"talking_point\": string }}]\n\n\
         CRITICAL RULES:\n\
         - The service_provider field MUST be empty string \"\" for ALL challenges; never suggest \
         specific firms\n\
         - Do NOT include any consulting firm, brokerage, or service provider names",
        context = build_company_context(company, campaign),
        name = company.name
    )
}
