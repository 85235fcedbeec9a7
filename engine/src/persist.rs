//! On-disk index layout: four files in one directory.
//!
//! - `vocabulary.txt` — `term_id term doc_freq` per line, term ids dense in
//!   write order.
//! - `index.bin` — for each vocabulary line in order, a little-endian
//!   `i32 list_size` followed by `list_size` little-endian `i32` pairs of
//!   `doc_id, tf`. No header; the vocabulary carries the structure.
//! - `documents.txt` — `doc_id<TAB>url<TAB>title`, dense from 0; holes are
//!   rows with empty url and title.
//! - `doc_lengths.txt` — one surface-token count per line, line i for doc i.
//!
//! `doc_lengths.txt` is optional on load (lengths fall back to 0, which
//! disables length normalisation in ranking); the other three are required.

use crate::index::{InvertedIndex, Posting};
use anyhow::{bail, Context, Result};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn vocabulary(&self) -> PathBuf {
        self.root.join("vocabulary.txt")
    }

    pub fn postings(&self) -> PathBuf {
        self.root.join("index.bin")
    }

    pub fn documents(&self) -> PathBuf {
        self.root.join("documents.txt")
    }

    pub fn doc_lengths(&self) -> PathBuf {
        self.root.join("doc_lengths.txt")
    }
}

fn write_i32<W: Write>(out: &mut W, value: i32) -> Result<()> {
    out.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(input: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)
        .with_context(|| format!("failed to create {}", paths.root.display()))?;

    let mut vocab = BufWriter::new(
        File::create(paths.vocabulary())
            .with_context(|| format!("failed to create {}", paths.vocabulary().display()))?,
    );
    let mut bin = BufWriter::new(
        File::create(paths.postings())
            .with_context(|| format!("failed to create {}", paths.postings().display()))?,
    );
    for (term_id, term) in index.terms.iter().enumerate() {
        let list = &index.postings[term_id];
        writeln!(vocab, "{} {} {}", term_id, term, list.len())?;
        write_i32(&mut bin, list.len() as i32)?;
        for posting in list {
            write_i32(&mut bin, posting.doc_id as i32)?;
            write_i32(&mut bin, posting.tf as i32)?;
        }
    }
    vocab.flush()?;
    bin.flush()?;

    let mut docs = BufWriter::new(
        File::create(paths.documents())
            .with_context(|| format!("failed to create {}", paths.documents().display()))?,
    );
    for (doc_id, url) in index.doc_urls.iter().enumerate() {
        writeln!(docs, "{}\t{}\t{}", doc_id, url, index.doc_titles[doc_id])?;
    }
    docs.flush()?;

    let mut lengths = BufWriter::new(
        File::create(paths.doc_lengths())
            .with_context(|| format!("failed to create {}", paths.doc_lengths().display()))?,
    );
    for length in &index.doc_lengths {
        writeln!(lengths, "{}", length)?;
    }
    lengths.flush()?;

    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let vocab = BufReader::new(
        File::open(paths.vocabulary())
            .with_context(|| format!("failed to open {}", paths.vocabulary().display()))?,
    );
    let mut bin = BufReader::new(
        File::open(paths.postings())
            .with_context(|| format!("failed to open {}", paths.postings().display()))?,
    );

    let mut index = InvertedIndex::new();
    // Posting blocks in index.bin follow vocabulary line order, so the two
    // files are consumed in lockstep.
    for line in vocab.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let _term_id = fields.next();
        let term = match fields.next() {
            Some(term) => term.to_string(),
            None => bail!("malformed vocabulary line: {line:?}"),
        };

        let list_size = read_i32(&mut bin)
            .with_context(|| format!("posting file truncated at term {term:?}"))?;
        if list_size < 0 {
            bail!("negative posting list size for term {term:?}");
        }
        let mut list = Vec::with_capacity(list_size as usize);
        for _ in 0..list_size {
            let doc_id = read_i32(&mut bin)?;
            let tf = read_i32(&mut bin)?;
            list.push(Posting {
                doc_id: doc_id as u32,
                tf: tf as u32,
            });
        }
        let term_id = index.intern(&term);
        index.postings[term_id as usize] = list;
    }

    let docs = BufReader::new(
        File::open(paths.documents())
            .with_context(|| format!("failed to open {}", paths.documents().display()))?,
    );
    for line in docs.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        // doc_id is also space-parseable, so split on tabs only.
        let mut fields = line.splitn(3, '\t');
        let doc_id: u32 = fields
            .next()
            .unwrap_or_default()
            .trim()
            .parse()
            .with_context(|| format!("malformed document line: {line:?}"))?;
        let url = fields.next().unwrap_or_default().to_string();
        let title = fields.next().unwrap_or_default().to_string();
        index.ensure_doc_slot(doc_id);
        index.doc_urls[doc_id as usize] = url;
        index.doc_titles[doc_id as usize] = title;
    }

    match File::open(paths.doc_lengths()) {
        Ok(file) => {
            for (i, line) in BufReader::new(file).lines().enumerate() {
                let length: u32 = line?.trim().parse().unwrap_or(0);
                if index.doc_lengths.len() <= i {
                    index.doc_lengths.resize(i + 1, 0);
                }
                index.doc_lengths[i] = length;
            }
        }
        Err(err) => {
            tracing::debug!(%err, "doc_lengths file missing; lengths default to 0");
        }
    }

    Ok(index)
}
