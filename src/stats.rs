use crate::models::{Lead, LeadStats};
use crate::score::{classify_lead, ScoreBand};

/// Band counts over the whole collection, independent of any active filter.
pub fn aggregate(all_leads: &[Lead]) -> LeadStats {
    let mut stats = LeadStats::default();
    for lead in all_leads {
        match classify_lead(lead) {
            ScoreBand::High => stats.high += 1,
            ScoreBand::Medium => stats.medium += 1,
            ScoreBand::Low => stats.low += 1,
        }
    }
    stats.total = stats.high + stats.medium + stats.low;
    stats
}
