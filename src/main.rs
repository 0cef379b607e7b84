use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod config;
mod db;
mod filter;
mod logging;
mod models;
mod notes;
mod query;
mod report;
mod score;
mod sort;
mod stats;
mod store;

use crate::db::PgStore;
use crate::notes::NoteLog;
use crate::query::QueryConfig;
use crate::sort::SortOrder;
use crate::store::LeadSource;

#[derive(Parser)]
#[command(name = "lead-review")]
#[command(about = "Review scored sales leads and record follow-up notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive substring of the customer name
    #[arg(long)]
    name: Option<String>,
    /// Exact job category, case-insensitive (e.g. technician, admin.)
    #[arg(long)]
    job: Option<String>,
    /// Exact loan status (e.g. "Has Loan", "No Loan")
    #[arg(long)]
    loan: Option<String>,
    #[arg(long, value_enum)]
    order: Option<SortOrder>,
    /// JSON filter config: {"nameQuery","jobFilter","loanFilter","order"}
    #[arg(long)]
    config: Option<String>,
}

impl FilterArgs {
    /// Flags given on the command line override the JSON config.
    fn into_config(self) -> anyhow::Result<QueryConfig> {
        let mut config = match self.config.as_deref() {
            Some(raw) => QueryConfig::from_json(raw)?,
            None => QueryConfig::reset(),
        };
        if let Some(name) = self.name {
            config.criteria.name_query = name;
        }
        if let Some(job) = self.job {
            config.criteria.job_filter = job;
        }
        if let Some(loan) = self.loan {
            config.criteria.loan_filter = loan;
        }
        let criteria = &config.criteria;
        if !criteria.job_filter.is_empty()
            && !filter::KNOWN_JOBS
                .iter()
                .any(|job| job.eq_ignore_ascii_case(&criteria.job_filter))
        {
            tracing::warn!(job = %criteria.job_filter, "job filter is not a known category");
        }
        if !criteria.loan_filter.is_empty()
            && !filter::KNOWN_LOAN_STATUSES.contains(&criteria.loan_filter.as_str())
        {
            tracing::warn!(loan = %criteria.loan_filter, "loan filter is not a known status");
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a few realistic leads
    Seed,
    /// Import leads from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show band statistics and the filtered, sorted lead list
    Leads {
        #[command(flatten)]
        filters: FilterArgs,
        /// Print at most this many of the displayed leads
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show one lead with its profile and notes
    Show { id: String },
    /// Append a follow-up note to a lead
    Note {
        id: String,
        #[arg(required = true, num_args = 1..)]
        body: Vec<String>,
    },
    /// Write the dashboard view as markdown
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "leads.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let cli = Cli::parse();
    let settings = config::Settings::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = PgStore::new(pool.clone());

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let count = db::seed(&pool).await?;
            println!("Seeded {count} leads.");
        }
        Commands::Import { csv } => {
            let written = db::import_csv(&pool, &csv).await?;
            println!("Imported {written} leads from {}.", csv.display());
        }
        Commands::Leads {
            filters,
            limit,
            json,
        } => {
            let config = filters.into_config()?;
            let all = store
                .fetch_leads(Some(settings.fetch_limit))
                .await
                .context("failed to fetch leads")?;
            let mut view = query::dashboard(&all, &config);
            if let Some(limit) = limit {
                view.displayed.truncate(limit);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            let stats = view.stats;
            println!(
                "{} leads: {} high, {} medium, {} low",
                stats.total, stats.high, stats.medium, stats.low
            );
            if view.displayed.is_empty() {
                println!("No leads match the current filters.");
                return Ok(());
            }
            println!("{} leads displayed:", view.displayed.len());
            for lead in &view.displayed {
                println!("- {}", report::lead_line(lead));
            }
        }
        Commands::Show { id } => {
            let lead = store
                .fetch_lead_detail(&id)
                .await
                .with_context(|| format!("failed to fetch lead {id}"))?;
            let mut log = NoteLog::new(&lead.id);
            log.load(&store).await;
            tracing::debug!(lead_id = %lead.id, state = ?log.state(), "notes loaded");
            print!("{}", report::build_detail(&lead, log.notes()));
        }
        Commands::Note { id, body } => {
            let body = body.join(" ");
            let mut log = NoteLog::new(id);
            log.load(&store).await;
            match log
                .append(&store, &body)
                .await
                .with_context(|| format!("failed to save note for lead {}", log.lead_id()))?
            {
                Some(note) => println!(
                    "Saved note for {} at {} ({} notes).",
                    note.lead_id,
                    report::note_timestamp(&note),
                    log.notes().len()
                ),
                None => println!("Note is empty, nothing saved."),
            }
        }
        Commands::Report { filters, out } => {
            let config = filters.into_config()?;
            let all = store
                .fetch_leads(Some(settings.fetch_limit))
                .await
                .context("failed to fetch leads")?;
            let view = query::dashboard(&all, &config);
            let report = report::build_report(&config, &view);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_json_config() {
        let args = FilterArgs {
            name: Some("ann".to_string()),
            order: Some(SortOrder::Ascending),
            config: Some(r#"{"jobFilter":"technician","order":"desc","nameQuery":"bob"}"#.to_string()),
            ..FilterArgs::default()
        };

        let config = args.into_config().unwrap();
        assert_eq!(config.criteria.name_query, "ann");
        assert_eq!(config.criteria.job_filter, "technician");
        assert_eq!(config.order, SortOrder::Ascending);
    }

    #[test]
    fn no_flags_reproduce_default_view() {
        let config = FilterArgs::default().into_config().unwrap();
        assert_eq!(config, QueryConfig::reset());
    }

    #[test]
    fn cli_parses_filters_and_note_body() {
        let cli = Cli::try_parse_from([
            "lead-review",
            "leads",
            "--job",
            "technician",
            "--loan",
            "Has Loan",
            "--order",
            "asc",
        ])
        .unwrap();
        match cli.command {
            Commands::Leads { filters, .. } => {
                assert_eq!(filters.loan.as_deref(), Some("Has Loan"));
                assert_eq!(filters.order, Some(SortOrder::Ascending));
            }
            _ => panic!("expected leads command"),
        }

        let cli = Cli::try_parse_from(["lead-review", "note", "LD-1", "call", "back", "Friday"]).unwrap();
        match cli.command {
            Commands::Note { id, body } => {
                assert_eq!(id, "LD-1");
                assert_eq!(body.join(" "), "call back Friday");
            }
            _ => panic!("expected note command"),
        }
    }
}
