//! Status matching and the counts shown on the dashboard and list pages
//!
//! Statuses arrive either as option codes (`"0"`, `"1"`, ...) or as words,
//! depending on the entity set, so every check accepts both.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::core::ids::parse_system_id;
use crate::models::requisition::RequisitionHeader;
use crate::models::rfq::{RfqPublishedLine, RfqVendorQuote};
use crate::models::tender::Tender;

/// Lifecycle of a requisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequisitionStatus {
    Open,
    Posted,
    Cancelled,
    Approved,
}

impl RequisitionStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Open => "0",
            Self::Posted => "1",
            Self::Cancelled => "2",
            Self::Approved => "3",
        }
    }

    pub fn word(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Posted => "Posted",
            Self::Cancelled => "Cancelled",
            Self::Approved => "Approved",
        }
    }

    /// `raw` is this status's code or, ignoring case, its word
    pub fn matches(self, raw: &str) -> bool {
        raw == self.code() || raw.eq_ignore_ascii_case(self.word())
    }
}

/// Open-for-quoting status of an RFQ line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfqStatus {
    Open,
    Closed,
}

impl RfqStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Open => "0",
            Self::Closed => "1",
        }
    }
}

// =============================================================================
// RFQ
// =============================================================================

/// RFQ tiles on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqCounts {
    pub open: usize,
    pub closed: usize,
    pub awarded: usize,
}

impl RfqCounts {
    pub fn from_lines(lines: &[RfqPublishedLine], vendor_no: &str) -> Self {
        let open_code = RfqStatus::Open.code();
        let closed_code = RfqStatus::Closed.code();
        Self {
            open: lines
                .iter()
                .filter(|l| l.rfq_status == open_code && !l.is_awarded())
                .count(),
            closed: lines
                .iter()
                .filter(|l| l.rfq_status == closed_code && !l.is_awarded())
                .count(),
            awarded: lines.iter().filter(|l| l.is_awarded_to(vendor_no)).count(),
        }
    }
}

/// Lines shown on the open-RFQ page: not awarded, status `0` or `open`
pub fn open_rfq_lines(lines: &[RfqPublishedLine]) -> Vec<RfqPublishedLine> {
    lines
        .iter()
        .filter(|l| {
            !l.is_awarded() && (l.rfq_status == "0" || l.rfq_status.eq_ignore_ascii_case("open"))
        })
        .cloned()
        .collect()
}

/// Lines that were closed without an award
pub fn closed_rfq_lines(lines: &[RfqPublishedLine]) -> Vec<RfqPublishedLine> {
    lines
        .iter()
        .filter(|l| l.rfq_status == RfqStatus::Closed.code() && !l.is_awarded())
        .cloned()
        .collect()
}

/// Lines awarded to `vendor_no`
pub fn awarded_rfq_lines(lines: &[RfqPublishedLine], vendor_no: &str) -> Vec<RfqPublishedLine> {
    lines
        .iter()
        .filter(|l| l.is_awarded_to(vendor_no))
        .cloned()
        .collect()
}

/// Split of the RFQ index page after the optional `status` query filter
///
/// Unlike the dedicated pages, the index lists every unawarded line as open
/// and every awarded line regardless of the winning vendor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RfqIndexLines {
    pub open: Vec<RfqPublishedLine>,
    pub awarded: Vec<RfqPublishedLine>,
}

impl RfqIndexLines {
    pub fn new(lines: &[RfqPublishedLine], status: Option<&str>) -> Self {
        let (awarded, mut open): (Vec<_>, Vec<_>) =
            lines.iter().cloned().partition(RfqPublishedLine::is_awarded);

        match status.filter(|s| !s.is_empty()) {
            Some(s) if s.eq_ignore_ascii_case("awarded") => open.clear(),
            Some(s) => open.retain(|l| l.rfq_status == s),
            None => {}
        }

        Self { open, awarded }
    }
}

/// System ids of lines the vendor already quoted, excluding the nil id
pub fn quoted_line_ids(quotes: &[RfqVendorQuote]) -> HashSet<Uuid> {
    quotes
        .iter()
        .map(|q| parse_system_id(&q.line_system_id))
        .filter(|id| !id.is_nil())
        .collect()
}

// =============================================================================
// Tenders
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderCounts {
    pub open: usize,
    pub closed: usize,
    pub awarded: usize,
}

impl TenderCounts {
    pub fn from_tenders(tenders: &[Tender]) -> Self {
        let count = |word: &str| {
            tenders
                .iter()
                .filter(|t| t.status.eq_ignore_ascii_case(word))
                .count()
        };
        Self {
            open: count("Open"),
            closed: count("Closed"),
            awarded: count("Awarded"),
        }
    }
}

// =============================================================================
// Requisitions
// =============================================================================

/// Requisition tiles on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionCounts {
    pub open_imprest: usize,
    pub cancelled_item: usize,
    pub completed: usize,
    pub approved: usize,
}

impl RequisitionCounts {
    pub fn from_headers(headers: &[RequisitionHeader]) -> Self {
        let count = |pred: &dyn Fn(&RequisitionHeader) -> bool| headers.iter().filter(|h| pred(h)).count();
        Self {
            open_imprest: count(&|h| {
                RequisitionStatus::Open.matches(&h.status) && h.requisition_type == "Imprest"
            }),
            cancelled_item: count(&|h| {
                RequisitionStatus::Cancelled.matches(&h.status) && h.requisition_type == "Item"
            }),
            completed: count(&|h| RequisitionStatus::Posted.matches(&h.status)),
            approved: count(&|h| RequisitionStatus::Approved.matches(&h.status)),
        }
    }
}

/// Requisitions grouped by status for the index page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisitionBuckets {
    pub open: Vec<RequisitionHeader>,
    pub posted: Vec<RequisitionHeader>,
    pub cancelled: Vec<RequisitionHeader>,
    pub approved: Vec<RequisitionHeader>,
}

impl RequisitionBuckets {
    pub fn from_headers(headers: &[RequisitionHeader]) -> Self {
        let bucket = |status: RequisitionStatus| {
            headers
                .iter()
                .filter(|h| status.matches(&h.status))
                .cloned()
                .collect::<Vec<_>>()
        };
        Self {
            open: bucket(RequisitionStatus::Open),
            posted: bucket(RequisitionStatus::Posted),
            cancelled: bucket(RequisitionStatus::Cancelled),
            approved: bucket(RequisitionStatus::Approved),
        }
    }

    /// Keep only the bucket named by `status`; any other value filters the
    /// open bucket by case-insensitive status
    pub fn apply_filter(&mut self, status: Option<&str>) {
        let Some(status) = status.filter(|s| !s.is_empty()) else {
            return;
        };

        if status.eq_ignore_ascii_case("Posted") {
            self.open.clear();
            self.cancelled.clear();
            self.approved.clear();
        } else if status.eq_ignore_ascii_case("Cancelled") {
            self.open.clear();
            self.posted.clear();
            self.approved.clear();
        } else if status.eq_ignore_ascii_case("Approved") {
            self.open.clear();
            self.posted.clear();
            self.cancelled.clear();
        } else {
            self.open.retain(|h| h.status.eq_ignore_ascii_case(status));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(status: &str, awarded_to: &str) -> RfqPublishedLine {
        RfqPublishedLine {
            rfq_status: status.into(),
            awarded_to_vendor_no: awarded_to.into(),
            ..Default::default()
        }
    }

    fn header(status: &str, kind: &str) -> RequisitionHeader {
        RequisitionHeader {
            status: status.into(),
            requisition_type: kind.into(),
            ..Default::default()
        }
    }

    mod rfq_tests {
        use super::*;

        #[test]
        fn test_dashboard_counts() {
            let lines = vec![
                line("0", ""),
                line("0", ""),
                line("1", ""),
                line("1", "V002"),
                line("0", " v001 "),
                line("1", "V001"),
            ];
            let counts = RfqCounts::from_lines(&lines, "V001");
            assert_eq!(
                counts,
                RfqCounts {
                    open: 2,
                    closed: 1,
                    awarded: 2
                }
            );
        }

        #[test]
        fn test_awarded_with_blank_vendor_counts_nothing() {
            let lines = vec![line("1", "V001")];
            assert_eq!(RfqCounts::from_lines(&lines, "").awarded, 0);
        }

        #[test]
        fn test_open_page_accepts_word_status() {
            let lines = vec![line("Open", ""), line("0", ""), line("1", ""), line("0", "V9")];
            assert_eq!(open_rfq_lines(&lines).len(), 2);
            assert_eq!(closed_rfq_lines(&lines).len(), 1);
        }

        #[test]
        fn test_index_filters() {
            let lines = vec![
                line("0", ""),
                line("Open", ""),
                line("1", ""),
                line("1", "V001"),
                line("1", "V002"),
            ];

            let all = RfqIndexLines::new(&lines, None);
            assert_eq!(all.open.len(), 3);
            assert_eq!(all.awarded.len(), 2);

            let awarded = RfqIndexLines::new(&lines, Some("AWARDED"));
            assert!(awarded.open.is_empty());
            assert_eq!(awarded.awarded.len(), 2);

            let exact = RfqIndexLines::new(&lines, Some("0"));
            assert_eq!(exact.open.len(), 1);
        }

        #[test]
        fn test_quoted_ids_skip_nil_and_garbage() {
            let id = Uuid::new_v4();
            let quotes = vec![
                RfqVendorQuote {
                    line_system_id: id.to_string(),
                    vendor_no: "V001".into(),
                },
                RfqVendorQuote {
                    line_system_id: id.to_string(),
                    vendor_no: "V001".into(),
                },
                RfqVendorQuote {
                    line_system_id: "garbage".into(),
                    vendor_no: "V001".into(),
                },
                RfqVendorQuote {
                    line_system_id: Uuid::nil().to_string(),
                    vendor_no: "V001".into(),
                },
            ];
            let ids = quoted_line_ids(&quotes);
            assert_eq!(ids.len(), 1);
            assert!(ids.contains(&id));
        }
    }

    mod tender_tests {
        use super::*;

        #[test]
        fn test_counts_ignore_case() {
            let tenders: Vec<Tender> = ["open", "OPEN", "Closed", "awarded", "Draft"]
                .iter()
                .map(|s| Tender {
                    status: s.to_string(),
                    ..Default::default()
                })
                .collect();
            assert_eq!(
                TenderCounts::from_tenders(&tenders),
                TenderCounts {
                    open: 2,
                    closed: 1,
                    awarded: 1
                }
            );
        }
    }

    mod requisition_tests {
        use super::*;

        #[test]
        fn test_status_matching() {
            assert!(RequisitionStatus::Open.matches("0"));
            assert!(RequisitionStatus::Open.matches("OPEN"));
            assert!(!RequisitionStatus::Open.matches("1"));
            assert!(RequisitionStatus::Approved.matches("3"));
        }

        #[test]
        fn test_dashboard_counts() {
            let headers = vec![
                header("0", "Imprest"),
                header("Open", "Imprest"),
                header("0", "Item"),
                header("2", "Item"),
                header("cancelled", "Imprest"),
                header("1", "Item"),
                header("Posted", "Imprest"),
                header("3", "Item"),
            ];
            assert_eq!(
                RequisitionCounts::from_headers(&headers),
                RequisitionCounts {
                    open_imprest: 2,
                    cancelled_item: 1,
                    completed: 2,
                    approved: 1
                }
            );
        }

        #[test]
        fn test_buckets_and_filters() {
            let headers = vec![
                header("0", "Imprest"),
                header("Open", "Item"),
                header("1", "Item"),
                header("2", "Item"),
                header("Approved", "Item"),
            ];

            let buckets = RequisitionBuckets::from_headers(&headers);
            assert_eq!(buckets.open.len(), 2);
            assert_eq!(buckets.posted.len(), 1);
            assert_eq!(buckets.cancelled.len(), 1);
            assert_eq!(buckets.approved.len(), 1);

            let mut posted = buckets.clone();
            posted.apply_filter(Some("posted"));
            assert!(posted.open.is_empty());
            assert!(posted.cancelled.is_empty());
            assert!(posted.approved.is_empty());
            assert_eq!(posted.posted.len(), 1);

            let mut open_word = buckets.clone();
            open_word.apply_filter(Some("open"));
            assert_eq!(open_word.open.len(), 1);
            assert_eq!(open_word.posted.len(), 1);

            let mut untouched = buckets.clone();
            untouched.apply_filter(Some(""));
            assert_eq!(untouched, buckets);
        }
    }
}
