use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::filter::{self, FilterCriteria};
use crate::models::{DashboardView, Lead};
use crate::score;
use crate::sort::{self, SortOrder};
use crate::stats;

/// Filter and sort settings as exchanged with callers:
/// `{ "nameQuery": "", "jobFilter": "", "loanFilter": "", "order": "desc" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryConfig {
    #[serde(flatten)]
    pub criteria: FilterCriteria,
    pub order: SortOrder,
}

impl QueryConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("invalid query configuration")
    }

    pub fn reset() -> Self {
        Self::default()
    }
}

/// Filtered, stably sorted copy of `all_leads`. The input is never modified.
pub fn query(all_leads: &[Lead], criteria: &FilterCriteria, order: SortOrder) -> Vec<Lead> {
    let mut displayed: Vec<Lead> = all_leads
        .iter()
        .filter(|lead| filter::matches(lead, criteria))
        .cloned()
        .collect();
    // `sort_by` is stable, ties keep their input order.
    displayed.sort_by(|a, b| sort::compare(a, b, order));
    displayed
}

pub fn dashboard(all_leads: &[Lead], config: &QueryConfig) -> DashboardView {
    score::warn_dirty_scores(all_leads);
    let displayed = query(all_leads, &config.criteria, config.order);
    let stats = stats::aggregate(all_leads);
    tracing::debug!(
        total = all_leads.len(),
        displayed = displayed.len(),
        order = %config.order,
        "recomputed lead view"
    );
    DashboardView { displayed, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadProfile;

    fn lead(id: &str, name: &str, score: Option<i32>, job: &str, loan: &str) -> Lead {
        Lead {
            id: id.to_string(),
            customer_name: name.to_string(),
            score,
            probability_score: None,
            job: Some(job.to_string()),
            loan_status: Some(loan.to_string()),
            profile: LeadProfile::default(),
        }
    }

    fn scored(id: &str, score: i32) -> Lead {
        lead(id, &format!("Customer {id}"), Some(score), "unknown", "No Loan")
    }

    fn ids(leads: &[Lead]) -> Vec<&str> {
        leads.iter().map(|lead| lead.id.as_str()).collect()
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let all = vec![scored("1", 90), scored("2", 90), scored("3", 40)];
        let empty = FilterCriteria::default();

        assert_eq!(ids(&query(&all, &empty, SortOrder::Descending)), vec!["1", "2", "3"]);
        assert_eq!(ids(&query(&all, &empty, SortOrder::Ascending)), vec!["3", "1", "2"]);
    }

    #[test]
    fn empty_criteria_return_a_sorted_permutation() {
        let all: Vec<Lead> = (0..30)
            .map(|i| scored(&i.to_string(), (i * 37 % 101) as i32))
            .collect();
        let displayed = query(&all, &FilterCriteria::default(), SortOrder::Descending);

        assert_eq!(displayed.len(), all.len());
        for lead in &all {
            assert_eq!(displayed.iter().filter(|d| d.id == lead.id).count(), 1);
        }
        assert!(displayed
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn repeated_queries_are_identical() {
        let all = vec![
            lead("a", "Anna", Some(70), "technician", "Has Loan"),
            lead("b", "Hannah", Some(70), "technician", "Has Loan"),
            lead("c", "Joanne", Some(95), "Technician", "Has Loan"),
            lead("d", "Annabel", Some(70), "student", "Has Loan"),
        ];
        let criteria = FilterCriteria {
            name_query: "ann".to_string(),
            job_filter: "technician".to_string(),
            loan_filter: "Has Loan".to_string(),
        };

        let first = query(&all, &criteria, SortOrder::Descending);
        let second = query(&all, &criteria, SortOrder::Descending);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["c", "a", "b"]);
    }

    #[test]
    fn input_collection_is_untouched() {
        let all = vec![scored("1", 10), scored("2", 90)];
        let before = all.clone();
        let _ = query(&all, &FilterCriteria::default(), SortOrder::Descending);
        assert_eq!(all, before);
    }

    #[test]
    fn dirty_lead_does_not_block_the_rest() {
        let all = vec![scored("1", 60), lead("2", "Broken", None, "unknown", "No Loan"), scored("3", 85)];
        let view = dashboard(&all, &QueryConfig::default());

        assert_eq!(ids(&view.displayed), vec!["3", "1", "2"]);
        assert_eq!(view.stats.low, 1);
        assert_eq!(view.stats.total, 3);
    }

    #[test]
    fn stats_ignore_active_filters() {
        let all = vec![
            lead("1", "Anna", Some(85), "technician", "Has Loan"),
            lead("2", "Bob", Some(55), "services", "No Loan"),
            lead("3", "Cara", Some(20), "student", "No Loan"),
        ];
        let config = QueryConfig {
            criteria: FilterCriteria {
                name_query: "anna".to_string(),
                ..FilterCriteria::default()
            },
            order: SortOrder::Ascending,
        };

        let view = dashboard(&all, &config);
        assert_eq!(ids(&view.displayed), vec!["1"]);
        assert_eq!(view.stats.total, 3);
        assert_eq!((view.stats.high, view.stats.medium, view.stats.low), (1, 1, 1));
    }

    #[test]
    fn config_parses_wire_shape_and_defaults() {
        let config = QueryConfig::from_json(
            r#"{"nameQuery":"ann","jobFilter":"technician","loanFilter":"Has Loan","order":"asc"}"#,
        )
        .unwrap();
        assert_eq!(config.criteria.name_query, "ann");
        assert_eq!(config.criteria.loan_filter, "Has Loan");
        assert_eq!(config.order, SortOrder::Ascending);

        let defaults = QueryConfig::from_json("{}").unwrap();
        assert_eq!(defaults, QueryConfig::reset());
        assert_eq!(defaults.order, SortOrder::Descending);

        assert!(QueryConfig::from_json(r#"{"order":"sideways"}"#).is_err());
    }
}
