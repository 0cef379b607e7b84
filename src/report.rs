use std::fmt::Write;

use serde_json::Value;

use crate::models::{DashboardView, Field, Lead, LeadStats, Note, ProfileSection};
use crate::query::QueryConfig;
use crate::score::{self, classify_lead};

const MISSING: &str = "-";
const NEVER_CONTACTED_DAYS: i64 = 999;

pub fn display_field(field: Field<&Value>) -> String {
    match field {
        Field::Present(Value::String(text)) => text.clone(),
        Field::Present(value) => value.to_string(),
        Field::Missing => MISSING.to_string(),
    }
}

pub fn note_timestamp(note: &Note) -> String {
    note.created_at
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "Just now".to_string())
}

fn score_text(lead: &Lead) -> String {
    match lead.score {
        Some(score) if !score::is_dirty(Some(score)) => format!("{score}"),
        Some(score) => format!("{score}?"),
        None => "?".to_string(),
    }
}

pub fn lead_line(lead: &Lead) -> String {
    format!(
        "{} {} ({}, {}) score {} [{}]",
        lead.id,
        lead.customer_name,
        lead.job.as_deref().unwrap_or(MISSING),
        lead.loan_status.as_deref().unwrap_or(MISSING),
        score_text(lead),
        classify_lead(lead).label()
    )
}

fn filter_label(config: &QueryConfig) -> String {
    let criteria = &config.criteria;
    if criteria.is_empty() {
        return format!("all leads, order {}", config.order);
    }
    let mut parts = Vec::new();
    if !criteria.name_query.is_empty() {
        parts.push(format!("name contains \"{}\"", criteria.name_query));
    }
    if !criteria.job_filter.is_empty() {
        parts.push(format!("job = {}", criteria.job_filter));
    }
    if !criteria.loan_filter.is_empty() {
        parts.push(format!("loan = {}", criteria.loan_filter));
    }
    format!("{}, order {}", parts.join(", "), config.order)
}

fn write_stats(output: &mut String, stats: &LeadStats) {
    let _ = writeln!(output, "- Total Leads: {}", stats.total);
    let _ = writeln!(output, "- High Potential: {}", stats.high);
    let _ = writeln!(output, "- Medium Potential: {}", stats.medium);
    let _ = writeln!(output, "- Low Potential: {}", stats.low);
}

pub fn build_report(config: &QueryConfig, view: &DashboardView) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Sales Lead Dashboard");
    let _ = writeln!(output, "Generated for {}", filter_label(config));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Score Bands");
    write_stats(&mut output, &view.stats);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Customer List ({} displayed)", view.displayed.len());

    if view.displayed.is_empty() {
        let _ = writeln!(output, "No leads match the current filters.");
    } else {
        for lead in &view.displayed {
            let _ = writeln!(output, "- {}", lead_line(lead));
        }
    }

    output
}

fn write_section(
    output: &mut String,
    lead: &Lead,
    title: &str,
    section: ProfileSection,
    keys: &[(&str, &str)],
) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");
    for (key, label) in keys {
        let field = lead.profile.field(section, key);
        let never_contacted = *key == "days_since_previous"
            && matches!(field, Field::Present(value) if value.as_i64() == Some(NEVER_CONTACTED_DAYS));
        let text = if never_contacted {
            "Never".to_string()
        } else {
            display_field(field)
        };
        let _ = writeln!(output, "- {label}: {text}");
    }
}

pub fn build_detail(lead: &Lead, notes: &[Note]) -> String {
    let mut output = String::new();
    let band = classify_lead(lead);

    let _ = writeln!(output, "# {}", lead.customer_name);
    let _ = writeln!(
        output,
        "ID {} | Job {} | Loan {}",
        lead.id,
        lead.job.as_deref().unwrap_or(MISSING),
        lead.loan_status.as_deref().unwrap_or(MISSING)
    );
    let _ = writeln!(
        output,
        "Conversion score {}/100 ({}, {})",
        score_text(lead),
        band.label(),
        band.tone().as_str()
    );

    write_section(
        &mut output,
        lead,
        "Personal Profile",
        ProfileSection::Demographic,
        &[
            ("age", "Age"),
            ("job", "Job"),
            ("marital_status", "Marital Status"),
            ("education", "Education"),
        ],
    );
    write_section(
        &mut output,
        lead,
        "Financial Profile",
        ProfileSection::Financial,
        &[
            ("average_balance", "Avg Balance"),
            ("defaulted_credit", "Credit Default"),
            ("housing_loan", "Housing Loan"),
            ("personal_loan", "Personal Loan"),
        ],
    );
    write_section(
        &mut output,
        lead,
        "Campaign History",
        ProfileSection::Campaign,
        &[
            ("last_contact_date", "Last Contact"),
            ("duration_seconds", "Contact Duration (s)"),
            ("contact_type", "Contact Type"),
            ("campaign_contacts", "Campaign Contacts"),
            ("days_since_previous", "Days Since Last"),
            ("previous_outcome", "Previous Outcome"),
        ],
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sales Notes ({})", notes.len());
    if notes.is_empty() {
        let _ = writeln!(output, "No notes yet");
    } else {
        for note in notes {
            let _ = writeln!(output, "- [{}] {}", note_timestamp(note), note.body);
        }
    }

    output
}
