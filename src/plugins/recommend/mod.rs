//! Recommendation engine.
//!
//! Evaluates the agent and rule catalogs against a snapshot. Every template is a
//! pair of pure functions over the snapshot, so a fixed snapshot always yields the
//! same ordered output. Templates never see each other's results.
//!
//! A template that panics, scores outside 0..=100, or produces an empty trigger or
//! target set is dropped for the run and reported as a diagnostic; the rest of the
//! catalog still runs.

pub mod agents;
pub mod rules;

use crate::core::config::Policy;
use crate::core::model::{
    AgentCategory, AgentRecommendation, Priority, Recommendations, RuleRecommendation,
};
use crate::core::reporter::{Diagnostic, Reporter};
use crate::core::snapshot::TechStackSnapshot;
use crate::core::tokens;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

pub use agents::AGENT_CATALOG;
pub use rules::RULE_CATALOG;

/// Materialized agent text, before identity and cost are attached.
#[derive(Debug, Clone, Default)]
pub struct AgentBody {
    pub description: String,
    pub reason: String,
    pub triggers: Vec<String>,
    pub capabilities: Vec<String>,
    pub relevant_files: Vec<String>,
}

pub struct AgentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub category: AgentCategory,
    pub score: fn(&TechStackSnapshot) -> u8,
    pub materialize: fn(&TechStackSnapshot) -> AgentBody,
}

#[derive(Debug, Clone, Default)]
pub struct RuleBody {
    pub content: String,
    pub applies_to: Vec<String>,
}

pub struct RuleTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub priority: Priority,
    pub category: AgentCategory,
    pub applies: fn(&TechStackSnapshot) -> bool,
    pub materialize: fn(&TechStackSnapshot) -> RuleBody,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wrap the process panic hook once so panics raised inside `isolated` on this
/// thread are not printed; the message reaches the reporter instead.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Run `f`, converting a panic into an error string.
fn isolated<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    install_quiet_hook();
    QUIET_PANICS.with(|q| q.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_PANICS.with(|q| q.set(false));
    result.map_err(|payload| format!("template panicked: {}", panic_message(payload.as_ref())))
}

fn normalize_triggers(raw: &[String]) -> BTreeSet<String> {
    raw.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn dedup_in_order(items: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|i| !i.trim().is_empty() && seen.insert(i.clone()))
        .collect()
}

fn token_cost(body: &AgentBody, triggers: &BTreeSet<String>, chars_per_token: usize) -> usize {
    let mut text = String::new();
    text.push_str(&body.description);
    text.push_str(&body.reason);
    for cap in &body.capabilities {
        text.push_str(cap);
    }
    for trigger in triggers {
        text.push_str(trigger);
    }
    tokens::estimate_by_ratio(&text, chars_per_token)
}

fn evaluate_agent(
    template: &AgentTemplate,
    snapshot: &TechStackSnapshot,
    policy: &Policy,
    reporter: &dyn Reporter,
) -> Option<AgentRecommendation> {
    let confidence = match isolated(|| (template.score)(snapshot)) {
        Ok(score) if score <= 100 => score,
        Ok(score) => {
            reporter.report(Diagnostic::warning(
                template.id,
                format!("score {} is outside 0..=100; agent skipped", score),
            ));
            return None;
        }
        Err(msg) => {
            reporter.report(Diagnostic::warning(template.id, msg));
            return None;
        }
    };
    if confidence < policy.inclusion_threshold {
        reporter.report(Diagnostic::trace(
            template.id,
            format!(
                "confidence {} below threshold {}",
                confidence, policy.inclusion_threshold
            ),
        ));
        return None;
    }

    let body = match isolated(|| (template.materialize)(snapshot)) {
        Ok(body) => body,
        Err(msg) => {
            reporter.report(Diagnostic::warning(template.id, msg));
            return None;
        }
    };
    let triggers = normalize_triggers(&body.triggers);
    if triggers.is_empty() {
        reporter.report(Diagnostic::warning(
            template.id,
            "materialized with no triggers; agent skipped",
        ));
        return None;
    }

    let estimated_token_cost = token_cost(&body, &triggers, policy.chars_per_token);
    Some(AgentRecommendation {
        id: template.id.to_string(),
        name: template.name.to_string(),
        category: template.category,
        confidence,
        description: body.description,
        reason: body.reason,
        triggers,
        capabilities: body.capabilities,
        relevant_files: dedup_in_order(body.relevant_files),
        estimated_token_cost,
    })
}

fn evaluate_rule(
    template: &RuleTemplate,
    snapshot: &TechStackSnapshot,
    reporter: &dyn Reporter,
) -> Option<RuleRecommendation> {
    match isolated(|| (template.applies)(snapshot)) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(msg) => {
            reporter.report(Diagnostic::warning(template.id, msg));
            return None;
        }
    }
    let body = match isolated(|| (template.materialize)(snapshot)) {
        Ok(body) => body,
        Err(msg) => {
            reporter.report(Diagnostic::warning(template.id, msg));
            return None;
        }
    };
    let applies_to = dedup_in_order(body.applies_to);
    if applies_to.is_empty() {
        reporter.report(Diagnostic::warning(
            template.id,
            "materialized with no target patterns; rule skipped",
        ));
        return None;
    }
    Some(RuleRecommendation {
        id: template.id.to_string(),
        title: template.title.to_string(),
        content: body.content,
        priority: template.priority,
        applies_to,
        category: template.category,
    })
}

/// Evaluate the built-in catalogs.
pub fn recommend(
    snapshot: &TechStackSnapshot,
    policy: &Policy,
    reporter: &dyn Reporter,
) -> Recommendations {
    recommend_with(AGENT_CATALOG, RULE_CATALOG, snapshot, policy, reporter)
}

/// Evaluate arbitrary catalogs. Agents come back by descending confidence with
/// catalog order breaking ties; rules keep catalog order.
pub fn recommend_with(
    agent_catalog: &[AgentTemplate],
    rule_catalog: &[RuleTemplate],
    snapshot: &TechStackSnapshot,
    policy: &Policy,
    reporter: &dyn Reporter,
) -> Recommendations {
    let mut agents: Vec<AgentRecommendation> = agent_catalog
        .iter()
        .filter_map(|t| evaluate_agent(t, snapshot, policy, reporter))
        .collect();
    agents.sort_by(|a, b| b.confidence.cmp(&a.confidence));

    let rules = rule_catalog
        .iter()
        .filter_map(|t| evaluate_rule(t, snapshot, reporter))
        .collect();

    Recommendations { agents, rules }
}
