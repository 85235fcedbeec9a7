use crate::index::{DocId, InvertedIndex, Posting, TermId};
use crate::persist::{self, IndexPaths};
use crate::tokenizer;
use crate::zipf::ZipfAnalyzer;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Records with less text than this are noise from the crawler and skipped.
const MIN_TEXT_BYTES: usize = 50;

/// One line of the crawler's JSONL output. Everything except `doc_id` is
/// optional so partial records still parse; the skip rules decide below.
#[derive(Debug, Deserialize)]
struct RawDoc {
    #[serde(default)]
    doc_id: Option<u32>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
}

/// Diagnostic counters for a build. Not load-bearing.
#[derive(Debug, Default, Clone)]
pub struct BuildStats {
    pub doc_count: u64,
    pub skipped_records: u64,
    pub total_tokens: u64,
    pub total_stems: u64,
    pub total_token_chars: u64,
    pub total_stem_chars: u64,
    pub total_text_bytes: u64,
}

/// Accumulates documents into an [`InvertedIndex`] and writes the on-disk
/// files. Append-only: there is no update or delete.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: InvertedIndex,
    zipf: ZipfAnalyzer,
    stats: BuildStats,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze `text` and fold the document into the index. Documents are
    /// expected in non-decreasing `doc_id` order, which keeps posting lists
    /// ascending as they are appended; [`save`](Self::save) restores the
    /// ordering if a caller strays.
    pub fn add_document(&mut self, doc_id: DocId, url: &str, title: &str, text: &str) {
        self.index.ensure_doc_slot(doc_id);
        self.index.doc_urls[doc_id as usize] = url.to_string();
        self.index.doc_titles[doc_id as usize] = title.to_string();
        self.stats.total_text_bytes += text.len() as u64;

        let analyzed = tokenizer::analyze(text);
        self.index.doc_lengths[doc_id as usize] = analyzed.len() as u32;
        self.stats.total_tokens += analyzed.len() as u64;

        let mut term_freqs: HashMap<TermId, u32> = HashMap::new();
        for (token, stem) in analyzed {
            self.stats.total_token_chars += token.len() as u64;
            if stem.is_empty() {
                continue;
            }
            self.stats.total_stems += 1;
            self.stats.total_stem_chars += stem.len() as u64;
            self.zipf.add_term(&stem);
            let term_id = self.index.intern(&stem);
            *term_freqs.entry(term_id).or_insert(0) += 1;
        }

        for (term_id, tf) in term_freqs {
            self.index.postings[term_id as usize].push(Posting { doc_id, tf });
        }
        self.stats.doc_count += 1;
    }

    /// Stream a JSONL file of document records through
    /// [`add_document`](Self::add_document). Malformed lines and records
    /// failing the skip rules (no `doc_id`, `text` missing or under
    /// [`MIN_TEXT_BYTES`]) are dropped without stopping the build; I/O
    /// errors are fatal.
    pub fn build_from_stream<P: AsRef<Path>>(&mut self, input: P) -> Result<()> {
        let path = input.as_ref();
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let raw: RawDoc = match serde_json::from_str(&line) {
                Ok(raw) => raw,
                Err(err) => {
                    self.stats.skipped_records += 1;
                    tracing::debug!(%err, "skipping malformed record");
                    continue;
                }
            };
            let Some(doc_id) = raw.doc_id else {
                self.stats.skipped_records += 1;
                continue;
            };
            if doc_id > i32::MAX as u32 || raw.text.len() < MIN_TEXT_BYTES {
                self.stats.skipped_records += 1;
                continue;
            }
            self.add_document(doc_id, &raw.url, &raw.title, &raw.text);
            if self.stats.doc_count % 1000 == 0 {
                tracing::info!(documents = self.stats.doc_count, "processed");
            }
        }
        Ok(())
    }

    /// Write the four index files to `dir`. Guarantees ascending posting
    /// lists regardless of the order documents were added in.
    pub fn save<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        for list in self.index.postings.iter_mut() {
            if !list.windows(2).all(|w| w[0].doc_id < w[1].doc_id) {
                list.sort_by_key(|posting| posting.doc_id);
            }
        }
        persist::save_index(&IndexPaths::new(dir), &self.index)
    }

    /// Write the Zipf frequency report.
    pub fn save_zipf<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.zipf.save_to_csv(path)
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn vocabulary_size(&self) -> usize {
        self.index.vocabulary_size()
    }

    pub fn total_postings(&self) -> u64 {
        self.index.total_postings()
    }
}
