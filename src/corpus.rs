//! Test corpus: the point labels a grammar is evaluated against

use serde::{Deserialize, Serialize};

/// Ordered list of raw point-label strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCorpus(Vec<String>);

impl TestCorpus {
    pub fn new(labels: Vec<String>) -> Self {
        TestCorpus(labels)
    }

    /// One label per non-blank line.
    pub fn from_lines(text: &str) -> Self {
        TestCorpus(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for TestCorpus {
    fn from(labels: Vec<String>) -> Self {
        TestCorpus(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_trimmed_and_blank_lines_dropped() {
        let corpus = TestCorpus::from_lines("AHU-1_SAT\n\n  VAV-2_ZNT  \r\n");
        assert_eq!(corpus.labels(), &["AHU-1_SAT", "VAV-2_ZNT"]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let corpus = TestCorpus::new(vec!["A".into(), "B".into()]);
        assert_eq!(serde_json::to_string(&corpus).unwrap(), r#"["A","B"]"#);
    }
}
