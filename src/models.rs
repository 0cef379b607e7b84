use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<i32>,
    #[serde(default)]
    pub probability_score: Option<f64>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub loan_status: Option<String>,
    #[serde(flatten)]
    pub profile: LeadProfile,
}

/// Demographic, financial and campaign documents carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadProfile {
    #[serde(default)]
    pub demographic_profile: Value,
    #[serde(default)]
    pub financial_profile: Value,
    #[serde(default)]
    pub campaign_history: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    Demographic,
    Financial,
    Campaign,
}

/// A profile value that may or may not have been supplied upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Present(T),
    Missing,
}

impl LeadProfile {
    pub fn section(&self, section: ProfileSection) -> &Value {
        match section {
            ProfileSection::Demographic => &self.demographic_profile,
            ProfileSection::Financial => &self.financial_profile,
            ProfileSection::Campaign => &self.campaign_history,
        }
    }

    /// `null` values and absent keys are both reported as missing.
    pub fn field(&self, section: ProfileSection, key: &str) -> Field<&Value> {
        match self.section(section).get(key) {
            Some(Value::Null) | None => Field::Missing,
            Some(value) => Field::Present(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "leadId")]
    pub lead_id: String,
    #[serde(rename = "note")]
    pub body: String,
    #[serde(rename = "timestamp", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeadStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub displayed: Vec<Lead>,
    pub stats: LeadStats,
}

/// Parses a raw score string. Floats are rounded; anything else is `None`.
pub fn parse_score(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i32>() {
        return Some(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .and_then(float_to_score)
}

fn float_to_score(value: f64) -> Option<i32> {
    let rounded = value.round();
    if rounded < i32::MIN as f64 || rounded > i32::MAX as f64 {
        return None;
    }
    Some(rounded as i32)
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(number)) => match number.as_i64() {
            Some(value) => i32::try_from(value).ok(),
            None => number.as_f64().and_then(float_to_score),
        },
        Some(Value::String(text)) => parse_score(&text),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dirty_scores_deserialize_without_failing() {
        let leads: Vec<Lead> = serde_json::from_value(json!([
            {"id": "a", "customer_name": "Ann", "score": 91},
            {"id": "b", "customer_name": "Bo", "score": "72"},
            {"id": "c", "customer_name": "Cy", "score": 64.6},
            {"id": "d", "customer_name": "Di", "score": "n/a"},
            {"id": "e", "customer_name": "Ed", "score": null},
            {"id": "f", "customer_name": "Fu"}
        ]))
        .unwrap();

        let scores: Vec<Option<i32>> = leads.iter().map(|lead| lead.score).collect();
        assert_eq!(scores, vec![Some(91), Some(72), Some(65), None, None, None]);
    }

    #[test]
    fn profile_sections_pass_through() {
        let lead: Lead = serde_json::from_value(json!({
            "id": "L-1",
            "customer_name": "Maria Lopez",
            "score": 80,
            "job": "technician",
            "loan_status": "No Loan",
            "demographic_profile": {"age": 41, "education": null},
            "campaign_history": {"days_since_previous": 999}
        }))
        .unwrap();

        assert_eq!(
            lead.profile.field(ProfileSection::Demographic, "age"),
            Field::Present(&json!(41))
        );
        assert_eq!(
            lead.profile.field(ProfileSection::Demographic, "education"),
            Field::Missing
        );
        assert_eq!(
            lead.profile.field(ProfileSection::Financial, "average_balance"),
            Field::Missing
        );

        let encoded = serde_json::to_value(&lead).unwrap();
        assert_eq!(encoded["campaign_history"]["days_since_previous"], 999);
    }

    #[test]
    fn note_uses_store_field_names() {
        let note: Note = serde_json::from_value(json!({
            "id": 7,
            "leadId": "L-1",
            "note": "Called, asked to follow up Friday",
            "timestamp": "2026-03-02T09:15:00Z"
        }))
        .unwrap();

        assert_eq!(note.id, Some(7));
        assert_eq!(note.body, "Called, asked to follow up Friday");
        assert!(note.created_at.is_some());
    }

    #[test]
    fn parse_score_handles_text() {
        assert_eq!(parse_score(" 55 "), Some(55));
        assert_eq!(parse_score("49.5"), Some(50));
        assert_eq!(parse_score("high"), None);
        assert_eq!(parse_score("NaN"), None);
    }
}
