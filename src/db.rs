use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{parse_score, Lead, LeadProfile, Note};
use crate::store::{LeadSource, NoteStore, StoreError};

const LEAD_COLUMNS: &str = "id, customer_name, score, probability_score, job, loan_status, \
     demographic_profile, financial_profile, campaign_history";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let leads = vec![
        seed_lead(
            "LD-0001",
            "Maria Lopez",
            91,
            "management",
            "No Loan",
            json!({"age": 44, "job": "management", "marital_status": "married", "education": "tertiary"}),
            json!({"defaulted_credit": "no", "average_balance": 5120, "housing_loan": "yes", "personal_loan": "no"}),
            json!({"last_contact_date": "2026-02-11", "contact_type": "cellular", "duration_seconds": 412,
                   "previous_outcome": "success", "campaign_contacts": 2, "previous_contacts": 1,
                   "days_since_previous": 94}),
        ),
        seed_lead(
            "LD-0002",
            "Budi Santoso",
            64,
            "technician",
            "Has Loan",
            json!({"age": 37, "job": "technician", "marital_status": "single", "education": "secondary"}),
            json!({"defaulted_credit": "no", "average_balance": 870, "housing_loan": "yes", "personal_loan": "yes"}),
            json!({"last_contact_date": "2026-01-28", "contact_type": "telephone", "duration_seconds": 188,
                   "previous_outcome": "unknown", "campaign_contacts": 3, "previous_contacts": 0,
                   "days_since_previous": 999}),
        ),
        seed_lead(
            "LD-0003",
            "Joanna Smith",
            38,
            "student",
            "No Loan",
            json!({"age": 22, "job": "student", "marital_status": "single", "education": null}),
            json!({"defaulted_credit": "no", "average_balance": 140, "housing_loan": "no", "personal_loan": "no"}),
            json!({"last_contact_date": null, "contact_type": "cellular", "duration_seconds": 61,
                   "previous_outcome": "failure", "campaign_contacts": 5, "previous_contacts": 2,
                   "days_since_previous": 31}),
        ),
    ];

    let mut upserted = 0usize;
    for lead in &leads {
        upsert_lead(pool, lead).await?;
        upserted += 1;
    }
    Ok(upserted)
}

#[allow(clippy::too_many_arguments)]
fn seed_lead(
    id: &str,
    name: &str,
    score: i32,
    job: &str,
    loan_status: &str,
    demographic: Value,
    financial: Value,
    campaign: Value,
) -> Lead {
    Lead {
        id: id.to_string(),
        customer_name: name.to_string(),
        score: Some(score),
        probability_score: Some(f64::from(score) / 100.0),
        job: Some(job.to_string()),
        loan_status: Some(loan_status.to_string()),
        profile: LeadProfile {
            demographic_profile: demographic,
            financial_profile: financial,
            campaign_history: campaign,
        },
    }
}

async fn upsert_lead(pool: &PgPool, lead: &Lead) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO lead_review.leads
        (id, customer_name, score, probability_score, job, loan_status,
         demographic_profile, financial_profile, campaign_history)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE
        SET customer_name = EXCLUDED.customer_name,
            score = EXCLUDED.score,
            probability_score = EXCLUDED.probability_score,
            job = EXCLUDED.job,
            loan_status = EXCLUDED.loan_status,
            demographic_profile = EXCLUDED.demographic_profile,
            financial_profile = EXCLUDED.financial_profile,
            campaign_history = EXCLUDED.campaign_history,
            updated_at = now()
        "#,
    )
    .bind(&lead.id)
    .bind(&lead.customer_name)
    .bind(lead.score)
    .bind(lead.probability_score)
    .bind(&lead.job)
    .bind(&lead.loan_status)
    .bind(&lead.profile.demographic_profile)
    .bind(&lead.profile.financial_profile)
    .bind(&lead.profile.campaign_history)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

fn lead_from_row(row: &PgRow) -> Result<Lead, sqlx::Error> {
    let json_column = |name: &str| -> Result<Value, sqlx::Error> {
        Ok(row.try_get::<Option<Value>, _>(name)?.unwrap_or(Value::Null))
    };

    Ok(Lead {
        id: row.try_get("id")?,
        customer_name: row.try_get("customer_name")?,
        score: row.try_get("score")?,
        probability_score: row.try_get("probability_score")?,
        job: row.try_get("job")?,
        loan_status: row.try_get("loan_status")?,
        profile: LeadProfile {
            demographic_profile: json_column("demographic_profile")?,
            financial_profile: json_column("financial_profile")?,
            campaign_history: json_column("campaign_history")?,
        },
    })
}

fn note_from_row(row: &PgRow) -> Result<Note, sqlx::Error> {
    Ok(Note {
        id: row.try_get("id")?,
        lead_id: row.try_get("lead_id")?,
        body: row.try_get("note")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Postgres-backed lead and note store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadSource for PgStore {
    async fn fetch_leads(&self, limit: Option<i64>) -> Result<Vec<Lead>, StoreError> {
        let query = format!("SELECT {LEAD_COLUMNS} FROM lead_review.leads ORDER BY seq LIMIT $1");
        let rows = sqlx::query(&query).bind(limit).fetch_all(&self.pool).await?;
        let leads = rows
            .iter()
            .map(lead_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(count = leads.len(), ?limit, "fetched leads");
        Ok(leads)
    }

    async fn fetch_lead_detail(&self, id: &str) -> Result<Lead, StoreError> {
        let query = format!("SELECT {LEAD_COLUMNS} FROM lead_review.leads WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(lead_from_row(&row)?)
    }
}

#[async_trait]
impl NoteStore for PgStore {
    async fn fetch_notes(&self, lead_id: &str) -> Result<Vec<Note>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, lead_id, note, created_at
            FROM lead_review.notes
            WHERE lead_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(note_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn save_note(&self, lead_id: &str, body: &str) -> Result<Note, StoreError> {
        let exists = sqlx::query("SELECT 1 FROM lead_review.leads WHERE id = $1")
            .bind(lead_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound(lead_id.to_string()));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO lead_review.notes (lead_id, note)
            VALUES ($1, $2)
            RETURNING id, lead_id, note, created_at
            "#,
        )
        .bind(lead_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(note_from_row(&row)?)
    }
}

#[derive(serde::Deserialize)]
struct CsvRow {
    id: Option<String>,
    customer_name: String,
    score: Option<String>,
    probability_score: Option<f64>,
    job: Option<String>,
    loan_status: Option<String>,
    demographic_profile: Option<String>,
    financial_profile: Option<String>,
    campaign_history: Option<String>,
}

fn json_cell(raw: Option<String>, column: &str, line: usize) -> anyhow::Result<Value> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Value::Null),
        Some(text) => serde_json::from_str(text)
            .with_context(|| format!("row {line}: column {column} is not valid JSON")),
    }
}

/// Reads leads from CSV. Unparseable scores are kept as missing rather than
/// rejecting the row; rows without an id get a fresh one.
pub fn read_leads_csv(csv_path: &std::path::Path) -> anyhow::Result<Vec<Lead>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut leads = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("row {line}: malformed record"))?;
        let score = row.score.as_deref().and_then(parse_score);
        if score.is_none() {
            tracing::warn!(line, raw = ?row.score, "score missing or unparseable, storing NULL");
        }

        leads.push(Lead {
            id: row
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("LD-{}", Uuid::new_v4())),
            customer_name: row.customer_name,
            score,
            probability_score: row.probability_score,
            job: row.job,
            loan_status: row.loan_status,
            profile: LeadProfile {
                demographic_profile: json_cell(row.demographic_profile, "demographic_profile", line)?,
                financial_profile: json_cell(row.financial_profile, "financial_profile", line)?,
                campaign_history: json_cell(row.campaign_history, "campaign_history", line)?,
            },
        });
    }

    Ok(leads)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let leads = read_leads_csv(csv_path)?;
    let mut written = 0usize;

    for lead in &leads {
        let affected = upsert_lead(pool, lead)
            .await
            .with_context(|| format!("failed to store lead {}", lead.id))?;
        if affected > 0 {
            written += 1;
        }
    }

    tracing::info!(rows = leads.len(), written, path = %csv_path.display(), "csv import finished");
    Ok(written)
}
