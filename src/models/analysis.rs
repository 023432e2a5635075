use serde::{Deserialize, Serialize};

/// Outcome of a completed analysis, before or after persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The validated input, as submitted
    pub transcript: String,
    /// Generated 2-3 sentence summary
    pub summary: String,
    /// Free-text emotional state label (e.g. "frustrated", "mildly anxious")
    pub sentiment: String,
}

/// One row of the record store
///
/// Column names and order are fixed: `Transcript`, `Summary`, `Sentiment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(rename = "Transcript")]
    pub transcript: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: String,
}

impl AnalysisRecord {
    pub const HEADERS: [&'static str; 3] = ["Transcript", "Summary", "Sentiment"];
}

impl From<AnalysisResult> for AnalysisRecord {
    fn from(result: AnalysisResult) -> Self {
        Self {
            transcript: result.transcript,
            summary: result.summary,
            sentiment: result.sentiment,
        }
    }
}

impl From<&AnalysisResult> for AnalysisRecord {
    fn from(result: &AnalysisResult) -> Self {
        result.clone().into()
    }
}

/// Aggregate view over the stored records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total_analyses: usize,
    /// Most frequent sentiment label; ties go to the label seen first
    pub most_common_sentiment: Option<String>,
    pub unique_sentiments: usize,
}

impl HistoryStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AnalysisRecord>,
    {
        // (label, count) in first-seen order
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut total = 0;

        for record in records {
            total += 1;
            match counts.iter_mut().find(|(label, _)| *label == record.sentiment) {
                Some((_, count)) => *count += 1,
                None => counts.push((record.sentiment.as_str(), 1)),
            }
        }

        let mut most_common: Option<(&str, usize)> = None;
        for &(label, count) in &counts {
            if most_common.is_none_or(|(_, best)| count > best) {
                most_common = Some((label, count));
            }
        }

        Self {
            total_analyses: total,
            most_common_sentiment: most_common.map(|(label, _)| label.to_string()),
            unique_sentiments: counts.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sentiment: &str) -> AnalysisRecord {
        AnalysisRecord {
            transcript: "t".to_string(),
            summary: "s".to_string(),
            sentiment: sentiment.to_string(),
        }
    }

    #[test]
    fn test_stats_empty() {
        let records: Vec<AnalysisRecord> = Vec::new();
        let stats = HistoryStats::from_records(&records);
        assert_eq!(stats, HistoryStats::default());
    }

    #[test]
    fn test_stats_most_common_and_unique() {
        let records = vec![
            record("Confused"),
            record("Frustrated"),
            record("Frustrated"),
            record("Satisfied"),
        ];
        let stats = HistoryStats::from_records(&records);
        assert_eq!(stats.total_analyses, 4);
        assert_eq!(stats.most_common_sentiment.as_deref(), Some("Frustrated"));
        assert_eq!(stats.unique_sentiments, 3);
    }

    #[test]
    fn test_stats_tie_goes_to_first_seen() {
        let records = vec![record("Anxious"), record("Angry"), record("Angry"), record("Anxious")];
        let stats = HistoryStats::from_records(&records);
        assert_eq!(stats.most_common_sentiment.as_deref(), Some("Anxious"));
    }

    #[test]
    fn test_record_from_result() {
        let result = AnalysisResult {
            transcript: "call".to_string(),
            summary: "summary".to_string(),
            sentiment: "neutral".to_string(),
        };
        let record = AnalysisRecord::from(&result);
        assert_eq!(record.transcript, "call");
        assert_eq!(record.summary, "summary");
        assert_eq!(record.sentiment, "neutral");
    }
}
