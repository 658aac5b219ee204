use crate::report::AnalysisReport;
use crate::scoring::RiskLevel;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    pub result: String,
    pub risk_level: RiskLevel,
    pub score: f64,
    pub confidence: f64,
}

impl From<&AnalysisReport> for HistoryEntry {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            url: report.url.clone(),
            result: report.classification.verdict().to_string(),
            risk_level: report.assessment.level,
            score: report.assessment.score,
            confidence: report.classification.confidence,
        }
    }
}

/// Analyses made during one session, newest first.
///
/// Owned by the caller and threaded through rendering; nothing here outlives
/// the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    #[serde(skip)]
    limit: usize,
}

impl SessionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn record(mut self, entry: HistoryEntry) -> Self {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
