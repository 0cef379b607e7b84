use serde::{Deserialize, Serialize};

use crate::models::Lead;

pub const KNOWN_JOBS: &[&str] = &[
    "admin.",
    "blue-collar",
    "entrepreneur",
    "housemaid",
    "management",
    "retired",
    "self-employed",
    "services",
    "student",
    "technician",
    "unemployed",
    "unknown",
];

pub const KNOWN_LOAN_STATUSES: &[&str] = &["Has Loan", "No Loan"];

/// Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub name_query: String,
    pub job_filter: String,
    pub loan_filter: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.name_query.is_empty() && self.job_filter.is_empty() && self.loan_filter.is_empty()
    }
}

pub fn matches_name(lead: &Lead, name_query: &str) -> bool {
    if name_query.is_empty() {
        return true;
    }
    lead.customer_name
        .to_lowercase()
        .contains(&name_query.to_lowercase())
}

pub fn matches_job(lead: &Lead, job_filter: &str) -> bool {
    if job_filter.is_empty() {
        return true;
    }
    lead.job
        .as_deref()
        .is_some_and(|job| job.to_lowercase() == job_filter.to_lowercase())
}

/// Exact, case-sensitive match.
pub fn matches_loan(lead: &Lead, loan_filter: &str) -> bool {
    if loan_filter.is_empty() {
        return true;
    }
    lead.loan_status
        .as_deref()
        .is_some_and(|status| status == loan_filter)
}

pub fn matches(lead: &Lead, criteria: &FilterCriteria) -> bool {
    matches_name(lead, &criteria.name_query)
        && matches_job(lead, &criteria.job_filter)
        && matches_loan(lead, &criteria.loan_filter)
}
