//! Printable results of CLI commands

use serde::Serialize;
use std::fmt;
use sz_error::{
    classification, extract_severity, harvest_candidates, harvest_match, CategoryTag, Classifier,
    Taxonomy,
};

/// Outcome of classifying one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    pub message: String,
    pub code: Option<u64>,
    pub severity: Option<char>,
    pub umbrella: Option<CategoryTag>,
    pub tags: Vec<CategoryTag>,
}

impl ClassificationReport {
    pub fn classify(classifier: &Classifier, message: &str) -> Self {
        let found = harvest_match(message);
        let err = classifier.convert(message.into());
        let layer = classification(&*err);

        Self {
            message: message.to_string(),
            code: found.as_ref().map(|m| m.code),
            severity: found.as_ref().and_then(|m| extract_severity(&m.candidate)),
            umbrella: layer.and_then(|l| l.umbrella()),
            tags: layer
                .and_then(|l| l.tags())
                .map(|tags| tags.to_vec())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());

        match self.umbrella {
            Some(umbrella) => {
                let tags: Vec<&str> = self.tags.iter().map(|t| t.as_str()).collect();
                write!(f, "{:>6}  {:<14} [{}]", code, umbrella.as_str(), tags.join(", "))
            }
            None => write!(f, "{:>6}  {:<14} []", code, "unclassified"),
        }
    }
}

/// Harvest trace for one message
#[derive(Debug, Clone, Serialize)]
pub struct ExplainReport {
    pub candidates: Vec<String>,
    pub winner: Option<usize>,
    pub code: Option<u64>,
    pub classification: ClassificationReport,
}

impl ExplainReport {
    pub fn explain(classifier: &Classifier, message: &str) -> Self {
        let found = harvest_match(message);
        Self {
            candidates: harvest_candidates(message),
            winner: found.as_ref().map(|m| m.index),
            code: found.map(|m| m.code),
            classification: ClassificationReport::classify(classifier, message),
        }
    }
}

impl fmt::Display for ExplainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Candidates ({}):", self.candidates.len())?;
        for (index, candidate) in self.candidates.iter().enumerate() {
            let marker = if Some(index) == self.winner { "*" } else { " " };
            writeln!(f, " {} [{}] {}", marker, index, candidate)?;
        }
        write!(f, "Result: {}", self.classification)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableEntry {
    pub code: u64,
    pub tags: Vec<CategoryTag>,
}

/// Dump of a taxonomy
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub name: String,
    pub version: String,
    pub entries: Vec<TableEntry>,
}

impl TableReport {
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        Self {
            name: taxonomy.name().to_string(),
            version: taxonomy.version().to_string(),
            entries: taxonomy
                .entries()
                .into_iter()
                .map(|(code, tags)| TableEntry {
                    code,
                    tags: tags.to_vec(),
                })
                .collect(),
        }
    }

    /// Keep only entries carrying `tag`
    pub fn retain_tag(&mut self, tag: CategoryTag) {
        self.entries.retain(|entry| entry.tags.contains(&tag));
    }
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "# {} v{} ({} codes)",
            self.name,
            self.version,
            self.entries.len()
        )?;
        for entry in &self.entries {
            let tags: Vec<&str> = entry.tags.iter().map(|t| t.as_str()).collect();
            write!(f, "\n{:>6}  {}", entry.code, tags.join(", "))?;
        }
        Ok(())
    }
}
