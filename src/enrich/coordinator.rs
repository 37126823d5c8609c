use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;

use crate::client::{AgentCaller, CallOptions};
use crate::domain::{Campaign, Company, EnrichedCompany};
use crate::error::{AgentError, AgentResult};
use crate::locate::parse_agent_result;
use crate::retry::{call_with_retry, RetryPolicy};

use super::merge::merge_slots;
use super::prompts::{
    build_competitive_intel_prompt, build_financial_growth_prompt, build_news_leadership_prompt,
    build_risk_workforce_prompt,
};
use super::{
    EnrichmentAgentIds, EnrichmentJob, EnrichmentProgress, EnrichmentReport, JobState, SlotState,
};

/// Entities enriched concurrently by default. Each entity fans out 4
/// sub-agent calls, so the default caps in-flight calls at 20.
pub const DEFAULT_ENTITY_WINDOW: usize = 5;

/// Runs the per-entity 4-way fan-out across a batch of companies with a
/// sliding concurrency window, merging slot payloads into composite records.
///
/// The coordinator itself is stateless between batches; the only
/// side-channel is the optional progress sender.
pub struct EnrichmentCoordinator {
    caller: Arc<dyn AgentCaller>,
    agents: EnrichmentAgentIds,
    retry: RetryPolicy,
    window: usize,
    progress_tx: Option<mpsc::Sender<EnrichmentProgress>>,
}

impl EnrichmentCoordinator {
    pub fn new(caller: Arc<dyn AgentCaller>, agents: EnrichmentAgentIds) -> Self {
        Self {
            caller,
            agents,
            retry: RetryPolicy::default(),
            window: DEFAULT_ENTITY_WINDOW,
            progress_tx: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_entity_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    /// Observe per-entity completion without waiting for the whole batch.
    pub fn with_progress(mut self, tx: mpsc::Sender<EnrichmentProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Enrich a batch. Individual entity failures never abort the batch; the
    /// batch as a whole fails only when nothing completed.
    pub async fn enrich_companies(
        &self,
        companies: &[Company],
        campaign: &Campaign,
    ) -> AgentResult<EnrichmentReport> {
        if companies.is_empty() {
            return Ok(EnrichmentReport::default());
        }

        let total = companies.len();
        let semaphore = Arc::new(Semaphore::new(self.window));
        let state = Arc::new(Mutex::new(BatchState::default()));
        let campaign = Arc::new(campaign.clone());

        self.send_progress(snapshot(&state, total)).await;

        let mut tasks = Vec::with_capacity(total);
        for company in companies.iter().cloned() {
            // The permit gates entity starts: a new fan-out begins only as a
            // running one completes.
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            state.lock().in_flight.push(company.name.clone());
            self.send_progress(snapshot(&state, total)).await;

            let caller = self.caller.clone();
            let agents = self.agents.clone();
            let retry = self.retry.clone();
            let campaign = campaign.clone();
            let state = state.clone();
            let progress_tx = self.progress_tx.clone();

            tasks.push(tokio::spawn(async move {
                let started = Instant::now();
                let (enriched, slots) =
                    enrich_single(caller.as_ref(), &agents, &retry, &company, &campaign).await;
                let elapsed = started.elapsed();

                let progress = {
                    let mut st = state.lock();
                    st.current += 1;
                    st.in_flight.retain(|n| n != &company.name);
                    if enriched.is_some() {
                        st.completed.push(company.name.clone());
                    }
                    EnrichmentProgress {
                        current: st.current,
                        total,
                        completed: st.completed.clone(),
                        in_flight: st.in_flight.clone(),
                    }
                };
                if let Some(tx) = &progress_tx {
                    let _ = tx.send(progress).await;
                }

                drop(permit);
                (company.name, enriched, slots, elapsed)
            }));
        }

        let mut report = EnrichmentReport::default();
        for task in tasks {
            let (name, enriched, slots, elapsed) = task
                .await
                .map_err(|e| AgentError::Internal(e.to_string()))?;
            report.total_elapsed += elapsed;
            let job_state = if enriched.is_some() {
                JobState::Complete
            } else {
                JobState::Failed
            };
            report.jobs.push(EnrichmentJob {
                company_name: name.clone(),
                slots,
                state: job_state,
            });
            match enriched {
                Some(record) => report.enriched.push(record),
                None => report.failed.push(name),
            }
        }

        tracing::info!(
            enriched = report.enriched.len(),
            failed = report.failed.len(),
            elapsed_secs = report.total_elapsed.as_secs_f64(),
            "enrichment batch drained"
        );

        if report.enriched.is_empty() {
            return Err(AgentError::NoDomainData(
                "Enrichment agents failed to return results. Please try again.".to_string(),
            ));
        }
        Ok(report)
    }

    async fn send_progress(&self, progress: EnrichmentProgress) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(progress).await;
        }
    }
}

#[derive(Default)]
struct BatchState {
    current: usize,
    completed: Vec<String>,
    in_flight: Vec<String>,
}

fn snapshot(state: &Mutex<BatchState>, total: usize) -> EnrichmentProgress {
    let st = state.lock();
    EnrichmentProgress {
        current: st.current,
        total,
        completed: st.completed.clone(),
        in_flight: st.in_flight.clone(),
    }
}

/// One entity's 4-way fan-out: all sub-agent calls run concurrently, each
/// behind the retry wrapper, and all settle before merging. A slow or failed
/// slot never blocks its siblings.
async fn enrich_single(
    caller: &dyn AgentCaller,
    agents: &EnrichmentAgentIds,
    retry: &RetryPolicy,
    company: &Company,
    campaign: &Campaign,
) -> (Option<EnrichedCompany>, [SlotState; 4]) {
    let calls = [
        (
            build_financial_growth_prompt(company, campaign),
            agents.financial_growth.as_str(),
        ),
        (
            build_news_leadership_prompt(company, campaign),
            agents.news_leadership.as_str(),
        ),
        (
            build_competitive_intel_prompt(company, campaign),
            agents.competitive_intel.as_str(),
        ),
        (
            build_risk_workforce_prompt(company, campaign),
            agents.risk_workforce.as_str(),
        ),
    ];

    let settled = join_all(calls.iter().map(|(prompt, agent_id)| {
        call_with_retry(caller, prompt, agent_id, CallOptions::default(), retry)
    }))
    .await;

    let parsed: Vec<Option<Value>> = settled.iter().map(parse_agent_result).collect();
    let slots = [
        slot_state(&parsed[0]),
        slot_state(&parsed[1]),
        slot_state(&parsed[2]),
        slot_state(&parsed[3]),
    ];
    let ok_count = slots.iter().filter(|s| **s == SlotState::Ok).count();
    tracing::debug!(
        company = %company.name,
        ok_count,
        "sub-agent fan-out settled"
    );

    let merged = merge_slots(
        &company.name,
        parsed[0].as_ref(),
        parsed[1].as_ref(),
        parsed[2].as_ref(),
        parsed[3].as_ref(),
    );
    (merged, slots)
}

fn slot_state(parsed: &Option<Value>) -> SlotState {
    if parsed.is_some() {
        SlotState::Ok
    } else {
        SlotState::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::client::AgentCallResponse;
    use crate::normalize::normalize;

    fn agents() -> EnrichmentAgentIds {
        EnrichmentAgentIds {
            financial_growth: "fin".into(),
            news_leadership: "news".into(),
            competitive_intel: "comp".into(),
            risk_workforce: "risk".into(),
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        }
    }

    fn company(name: &str) -> Company {
        Company {
            name: name.into(),
            industry: "Manufacturing".into(),
            hq_location: String::new(),
            estimated_size: String::new(),
            relevance_score: 5.0,
            relevance_reasoning: String::new(),
            website: String::new(),
            source_segment: None,
        }
    }

    fn campaign() -> Campaign {
        Campaign::new("c1", "test", "find manufacturers")
    }

    /// Succeeds or fails per agent id; tracks concurrent in-flight calls and
    /// distinct in-flight entities (every prompt embeds `for "<name>"`).
    struct SlotCaller {
        failing_agents: Vec<&'static str>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        entities: parking_lot::Mutex<std::collections::HashMap<String, usize>>,
        max_entities: AtomicUsize,
        delay: Duration,
    }

    impl SlotCaller {
        fn new(failing_agents: Vec<&'static str>) -> Self {
            Self {
                failing_agents,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                entities: parking_lot::Mutex::new(std::collections::HashMap::new()),
                max_entities: AtomicUsize::new(0),
                delay: Duration::from_millis(5),
            }
        }

        fn entity_of(message: &str) -> String {
            let start = message.find("for \"").map(|i| i + 5).unwrap_or(0);
            message[start..]
                .split('"')
                .next()
                .unwrap_or("unknown")
                .to_string()
        }
    }

    #[async_trait]
    impl AgentCaller for SlotCaller {
        async fn call(
            &self,
            message: &str,
            agent_id: &str,
            _options: CallOptions,
        ) -> AgentCallResponse {
            let entity = Self::entity_of(message);
            {
                let mut entities = self.entities.lock();
                *entities.entry(entity.clone()).or_insert(0) += 1;
                self.max_entities.fetch_max(entities.len(), Ordering::SeqCst);
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            {
                let mut entities = self.entities.lock();
                if let Some(count) = entities.get_mut(&entity) {
                    *count -= 1;
                    if *count == 0 {
                        entities.remove(&entity);
                    }
                }
            }

            if self.failing_agents.contains(&agent_id) {
                return AgentCallResponse::failure("agent exploded");
            }
            let payload = match agent_id {
                "fin" => json!({"revenue": {"figure": "$9M", "year": "2025", "source": "filing"},
                                 "growth_indicators": [{"type": "hiring", "detail": "x"}]}),
                "news" => json!({"recent_news": [{"date": "2026-06-01", "headline": "h"}],
                                  "csuite_changes": []}),
                "comp" => json!({"competitive_intel": {"vendors": ["AWS"], "partners": [], "competitors": []}}),
                _ => json!({"risk_insurance_challenges": [], "hr_workforce_challenges": [],
                            "key_sales_nuggets": [{"nugget": "n", "category": "Funding"}]}),
            };
            AgentCallResponse::completed(normalize(payload))
        }
    }

    #[tokio::test]
    async fn test_all_slots_ok_merges_full_record() {
        let caller = Arc::new(SlotCaller::new(vec![]));
        let coordinator = EnrichmentCoordinator::new(caller, agents()).with_retry_policy(fast_retry());
        let report = coordinator
            .enrich_companies(&[company("Acme")], &campaign())
            .await
            .unwrap();
        assert_eq!(report.enriched.len(), 1);
        let record = &report.enriched[0];
        assert_eq!(record.revenue.figure, "$9M");
        assert_eq!(record.recent_news.len(), 1);
        assert_eq!(record.competitive_intel.vendors, vec!["AWS"]);
        assert_eq!(record.key_sales_nuggets.len(), 1);
        assert_eq!(report.jobs[0].state, JobState::Complete);
    }

    #[tokio::test]
    async fn test_partial_slots_complete_with_defaults() {
        // News and risk slots fail; entity still completes.
        let caller = Arc::new(SlotCaller::new(vec!["news", "risk"]));
        let coordinator = EnrichmentCoordinator::new(caller, agents()).with_retry_policy(fast_retry());
        let report = coordinator
            .enrich_companies(&[company("Acme")], &campaign())
            .await
            .unwrap();
        assert_eq!(report.enriched.len(), 1);
        assert!(report.failed.is_empty());
        let record = &report.enriched[0];
        assert_eq!(record.revenue.figure, "$9M");
        assert!(record.recent_news.is_empty());
        assert!(record.key_sales_nuggets.is_empty());
        assert_eq!(
            report.jobs[0].slots,
            [SlotState::Ok, SlotState::Error, SlotState::Ok, SlotState::Error]
        );
    }

    #[tokio::test]
    async fn test_all_slots_failing_fails_batch() {
        let caller = Arc::new(SlotCaller::new(vec!["fin", "news", "comp", "risk"]));
        let coordinator = EnrichmentCoordinator::new(caller, agents()).with_retry_policy(fast_retry());
        let err = coordinator
            .enrich_companies(&[company("Acme")], &campaign())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NoDomainData(_)));
    }

    #[tokio::test]
    async fn test_one_failed_entity_does_not_abort_batch() {
        // Fails all four slots for one specific company only.
        struct PerCompanyCaller;
        #[async_trait]
        impl AgentCaller for PerCompanyCaller {
            async fn call(
                &self,
                message: &str,
                _agent_id: &str,
                _options: CallOptions,
            ) -> AgentCallResponse {
                if message.contains("\"Doomed\"") {
                    AgentCallResponse::failure("agent exploded")
                } else {
                    AgentCallResponse::completed(normalize(
                        json!({"revenue": {"figure": "$1M"}}),
                    ))
                }
            }
        }

        let coordinator = EnrichmentCoordinator::new(Arc::new(PerCompanyCaller), agents())
            .with_retry_policy(fast_retry());
        let report = coordinator
            .enrich_companies(&[company("Acme"), company("Doomed")], &campaign())
            .await
            .unwrap();
        assert_eq!(report.enriched.len(), 1);
        assert_eq!(report.failed, vec!["Doomed".to_string()]);
    }

    #[tokio::test]
    async fn test_window_caps_concurrent_subcalls() {
        let caller = Arc::new(SlotCaller::new(vec![]));
        let companies: Vec<Company> = (0..10).map(|i| company(&format!("c{i}"))).collect();
        let coordinator = EnrichmentCoordinator::new(caller.clone(), agents())
            .with_retry_policy(fast_retry())
            .with_entity_window(5);
        coordinator
            .enrich_companies(&companies, &campaign())
            .await
            .unwrap();
        // Never more than 5 entities fanned out at once, so never more than
        // 5 x 4 sub-calls in flight.
        assert!(caller.max_entities.load(Ordering::SeqCst) <= 5);
        assert!(caller.max_in_flight.load(Ordering::SeqCst) <= 20);
    }

    #[tokio::test]
    async fn test_narrow_window_is_enforced() {
        let caller = Arc::new(SlotCaller::new(vec![]));
        let companies: Vec<Company> = (0..6).map(|i| company(&format!("c{i}"))).collect();
        let coordinator = EnrichmentCoordinator::new(caller.clone(), agents())
            .with_retry_policy(fast_retry())
            .with_entity_window(2);
        coordinator
            .enrich_companies(&companies, &campaign())
            .await
            .unwrap();
        assert!(caller.max_entities.load(Ordering::SeqCst) <= 2);
        assert!(caller.max_in_flight.load(Ordering::SeqCst) <= 8);
    }

    #[tokio::test]
    async fn test_progress_events_cover_every_entity() {
        let caller = Arc::new(SlotCaller::new(vec![]));
        let (tx, mut rx) = mpsc::channel(64);
        let companies: Vec<Company> = (0..4).map(|i| company(&format!("c{i}"))).collect();
        let coordinator = EnrichmentCoordinator::new(caller, agents())
            .with_retry_policy(fast_retry())
            .with_progress(tx);
        coordinator
            .enrich_companies(&companies, &campaign())
            .await
            .unwrap();

        let mut last = None;
        while let Ok(p) = rx.try_recv() {
            last = Some(p);
        }
        let last = last.unwrap();
        assert_eq!(last.current, 4);
        assert_eq!(last.total, 4);
        assert_eq!(last.completed.len(), 4);
        assert!(last.in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_report() {
        let caller = Arc::new(SlotCaller::new(vec![]));
        let coordinator = EnrichmentCoordinator::new(caller, agents());
        let report = coordinator.enrich_companies(&[], &campaign()).await.unwrap();
        assert!(report.enriched.is_empty());
        assert!(report.jobs.is_empty());
    }
}
