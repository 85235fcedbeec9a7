use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Rows written to the CSV report; the full frequency table stays in memory.
const MAX_REPORT_ROWS: usize = 10_000;

/// Corpus-wide stem frequency counter behind the `zipf_stats.csv` report.
/// Informational only; nothing in the index depends on it.
#[derive(Debug, Default)]
pub struct ZipfAnalyzer {
    term_frequencies: HashMap<String, u64>,
}

impl ZipfAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, term: &str) {
        if let Some(count) = self.term_frequencies.get_mut(term) {
            *count += 1;
        } else {
            self.term_frequencies.insert(term.to_string(), 1);
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.term_frequencies.len()
    }

    pub fn total_terms(&self) -> u64 {
        self.term_frequencies.values().sum()
    }

    /// Terms sorted by frequency descending; equal frequencies order by term
    /// ascending so the report is deterministic.
    pub fn ranked(&self) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = self
            .term_frequencies
            .iter()
            .map(|(term, &freq)| (term.clone(), freq))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Write `rank,frequency,term` rows, capped at [`MAX_REPORT_ROWS`].
    pub fn save_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "rank,frequency,term")?;
        for (i, (term, freq)) in self.ranked().iter().take(MAX_REPORT_ROWS).enumerate() {
            writeln!(out, "{},{},{}", i + 1, freq, term)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repeated_terms() {
        let mut zipf = ZipfAnalyzer::new();
        zipf.add_term("vault");
        zipf.add_term("vault");
        zipf.add_term("dweller");
        assert_eq!(zipf.vocabulary_size(), 2);
        assert_eq!(zipf.total_terms(), 3);
    }

    #[test]
    fn ranks_by_frequency_then_term() {
        let mut zipf = ZipfAnalyzer::new();
        for term in ["beta", "alpha", "beta", "gamma", "alpha", "beta"] {
            zipf.add_term(term);
        }
        let ranked = zipf.ranked();
        assert_eq!(
            ranked,
            vec![
                ("beta".to_string(), 3),
                ("alpha".to_string(), 2),
                ("gamma".to_string(), 1),
            ]
        );
    }

    #[test]
    fn csv_report_has_header_and_one_based_ranks() {
        let mut zipf = ZipfAnalyzer::new();
        zipf.add_term("vault");
        zipf.add_term("vault");
        zipf.add_term("nuka");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zipf_stats.csv");
        zipf.save_to_csv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "rank,frequency,term\n1,2,vault\n2,1,nuka\n");
    }
}
