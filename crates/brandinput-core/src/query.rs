//! JQL construction for the four variety searches.
//!
//! Predicate values come from configuration verbatim (e.g. `("Task","Story")`
//! or `"Open"`), so quoting is the operator's responsibility.

use crate::app_config::JqlConfig;
use crate::ticket::Variety;

/// A search issued for one variety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub variety: Variety,
    pub jql: String,
}

impl TicketQuery {
    #[must_use]
    pub fn for_variety(variety: Variety, config: &JqlConfig) -> Self {
        Self {
            variety,
            jql: build_jql(variety, config),
        }
    }
}

/// Builds the JQL for `variety`.
///
/// Standard, YouTube and In-Flight ROI share the reporter/issue type/vertical
/// predicates and differ in the product and media-partner clauses. Retail drops
/// reporter and product, searches the retail vertical, and only excludes the
/// media partner.
#[must_use]
pub fn build_jql(variety: Variety, c: &JqlConfig) -> String {
    const MEDIA_PARTNER: &str = "\"Media Partner - HUB\"";
    const NOT_TEST: &str = "NOT summary ~ \"test*\"";

    let (product_op, partner_op) = match variety {
        Variety::Standard => ("NOT IN", "NOT IN"),
        Variety::YouTube => ("NOT IN", "IN"),
        Variety::InFlightRoi => ("IN", "NOT IN"),
        Variety::Retail => {
            return format!(
                "project = {} AND issuetype IN {} AND vertical IN {} AND status = {} \
                 AND {MEDIA_PARTNER} NOT IN {} AND {NOT_TEST}",
                c.project, c.issue_type, c.retail_vertical, c.status, c.yt_media_partner
            );
        }
    };

    format!(
        "project = {} AND reporter IN {} AND issuetype IN {} AND vertical IN {} AND status = {} \
         AND product {product_op} {} AND {MEDIA_PARTNER} {partner_op} {} AND {NOT_TEST}",
        c.project, c.reporter, c.issue_type, c.vertical, c.status, c.product, c.yt_media_partner
    )
}
