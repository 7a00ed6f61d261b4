//! Per-variety processing policy.
//!
//! One row per variety replaces four hand-written processing branches; the
//! orchestrator iterates the table uniformly.

use crate::app_config::JqlConfig;
use crate::query::TicketQuery;
use crate::ticket::Variety;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarietyPolicy {
    pub variety: Variety,
    pub query: TicketQuery,
    /// Appended to the record's watcher list before population.
    pub extra_watchers: Vec<String>,
    /// Resolve, fetch and populate fields.
    pub populate: bool,
    /// Restricted-tier records get the minimal treatment.
    pub branch_on_tier: bool,
    /// Transition the ticket; after a successful population when `populate`
    /// is set, unconditionally otherwise.
    pub progress: bool,
}

impl VarietyPolicy {
    /// The four policies, in dispatch order.
    #[must_use]
    pub fn table(
        jql: &JqlConfig,
        youtube_watchers: &[String],
        roi_watchers: &[String],
    ) -> Vec<VarietyPolicy> {
        Variety::ALL
            .into_iter()
            .map(|variety| {
                let query = TicketQuery::for_variety(variety, jql);
                match variety {
                    Variety::Standard => VarietyPolicy {
                        variety,
                        query,
                        extra_watchers: Vec::new(),
                        populate: true,
                        branch_on_tier: true,
                        progress: true,
                    },
                    Variety::YouTube => VarietyPolicy {
                        variety,
                        query,
                        extra_watchers: youtube_watchers.to_vec(),
                        populate: true,
                        branch_on_tier: false,
                        progress: false,
                    },
                    Variety::InFlightRoi => VarietyPolicy {
                        variety,
                        query,
                        extra_watchers: roi_watchers.to_vec(),
                        populate: true,
                        branch_on_tier: false,
                        progress: false,
                    },
                    Variety::Retail => VarietyPolicy {
                        variety,
                        query,
                        extra_watchers: Vec::new(),
                        populate: false,
                        branch_on_tier: false,
                        progress: true,
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jql() -> JqlConfig {
        JqlConfig {
            project: "MEAS".to_string(),
            reporter: "(bot)".to_string(),
            issue_type: "(Task)".to_string(),
            vertical: "(CPG)".to_string(),
            retail_vertical: "(Retail)".to_string(),
            status: "Open".to_string(),
            product: "(ROI)".to_string(),
            yt_media_partner: "(YouTube)".to_string(),
        }
    }

    fn policy(table: &[VarietyPolicy], variety: Variety) -> &VarietyPolicy {
        table
            .iter()
            .find(|p| p.variety == variety)
            .expect("every variety has a policy")
    }

    #[test]
    fn table_has_one_row_per_variety() {
        let table = VarietyPolicy::table(&jql(), &[], &[]);
        assert_eq!(table.len(), 4);
        for (row, variety) in table.iter().zip(Variety::ALL) {
            assert_eq!(row.variety, variety);
            assert_eq!(row.query.variety, variety);
        }
    }

    #[test]
    fn only_standard_populates_and_progresses() {
        let table = VarietyPolicy::table(&jql(), &[], &[]);
        let standard = policy(&table, Variety::Standard);
        assert!(standard.populate && standard.progress && standard.branch_on_tier);

        for variety in [Variety::YouTube, Variety::InFlightRoi] {
            let row = policy(&table, variety);
            assert!(row.populate, "{variety} populates");
            assert!(!row.progress, "{variety} does not progress");
        }

        let retail = policy(&table, Variety::Retail);
        assert!(!retail.populate && retail.progress);
    }

    #[test]
    fn extra_watchers_land_on_youtube_and_roi_only() {
        let youtube = vec!["andy.fortna".to_string()];
        let roi = vec!["isobel.brooks".to_string(), "cara.manion".to_string()];
        let table = VarietyPolicy::table(&jql(), &youtube, &roi);

        assert_eq!(policy(&table, Variety::YouTube).extra_watchers, youtube);
        assert_eq!(policy(&table, Variety::InFlightRoi).extra_watchers, roi);
        assert!(policy(&table, Variety::Standard).extra_watchers.is_empty());
        assert!(policy(&table, Variety::Retail).extra_watchers.is_empty());
    }
}
