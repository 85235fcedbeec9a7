use engine::builder::IndexBuilder;
use engine::persist::{load_index, IndexPaths};
use engine::SearchEngine;
use std::fs;

fn seeded_corpus() -> IndexBuilder {
    let mut builder = IndexBuilder::new();
    builder.add_document(0, "u0", "Vault", "The vault dweller found a pip-boy in the vault.");
    builder.add_document(1, "u1", "Nuka", "Nuka-Cola Quantum glows in the dark.");
    builder.add_document(2, "u2", "Raiders", "Raiders ambush the vault dweller near the vault.");
    builder
}

#[test]
fn save_then_load_round_trips_exactly() {
    let mut builder = seeded_corpus();
    let dir = tempfile::tempdir().unwrap();
    builder.save(dir.path()).unwrap();

    let loaded = load_index(&IndexPaths::new(dir.path())).unwrap();
    assert_eq!(&loaded, builder.index());
}

#[test]
fn loaded_index_answers_queries_identically() {
    let mut builder = seeded_corpus();
    let dir = tempfile::tempdir().unwrap();
    builder.save(dir.path()).unwrap();

    let in_memory = SearchEngine::new(builder.index().clone());
    let reloaded = SearchEngine::load(dir.path()).unwrap();
    for query in [
        "vault",
        "vault AND dweller",
        "vault AND NOT raiders",
        "nuka OR raiders",
        "NOT vault",
        "(vault OR nuka) AND dweller",
    ] {
        assert_eq!(
            in_memory.search(query),
            reloaded.search(query),
            "diverged on {query:?}"
        );
    }
}

#[test]
fn on_disk_layout_is_bit_exact() {
    let mut builder = IndexBuilder::new();
    builder.add_document(0, "u", "t", "vault vault dweller");
    let dir = tempfile::tempdir().unwrap();
    builder.save(dir.path()).unwrap();
    let paths = IndexPaths::new(dir.path());

    // Terms get dense ids in first-seen order: vault then dweller.
    assert_eq!(
        fs::read_to_string(paths.vocabulary()).unwrap(),
        "0 vault 2\n1 dweller 1\n"
    );
    assert_eq!(fs::read_to_string(paths.documents()).unwrap(), "0\tu\tt\n");
    assert_eq!(fs::read_to_string(paths.doc_lengths()).unwrap(), "3\n");

    // index.bin: per term, little-endian i32 list_size then (doc_id, tf)
    // pairs, in vocabulary order.
    let bin = fs::read(paths.postings()).unwrap();
    let expected: Vec<u8> = [1i32, 0, 2, 1, 0, 1]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    assert_eq!(bin, expected);
}

#[test]
fn holes_round_trip_as_empty_rows() {
    let mut builder = IndexBuilder::new();
    builder.add_document(0, "u0", "t0", "alpha beta");
    builder.add_document(2, "u2", "t2", "alpha gamma");
    let dir = tempfile::tempdir().unwrap();
    builder.save(dir.path()).unwrap();
    let paths = IndexPaths::new(dir.path());

    assert_eq!(
        fs::read_to_string(paths.documents()).unwrap(),
        "0\tu0\tt0\n1\t\t\n2\tu2\tt2\n"
    );

    let loaded = load_index(&paths).unwrap();
    assert_eq!(loaded.num_doc_slots(), 3);
    assert_eq!(loaded.doc_urls[1], "");
    assert_eq!(loaded.doc_lengths, vec![2, 0, 2]);
}

#[test]
fn missing_doc_lengths_is_tolerated() {
    let mut builder = seeded_corpus();
    let dir = tempfile::tempdir().unwrap();
    builder.save(dir.path()).unwrap();
    let paths = IndexPaths::new(dir.path());
    fs::remove_file(paths.doc_lengths()).unwrap();

    let loaded = load_index(&paths).unwrap();
    assert!(loaded.doc_lengths.iter().all(|&len| len == 0));

    // Ranking degrades to unnormalised scores but search still answers.
    let engine = SearchEngine::new(loaded);
    let (_, total) = engine.search("vault");
    assert_eq!(total, 2);
}

#[test]
fn missing_required_files_are_fatal() {
    let mut builder = seeded_corpus();
    for victim in ["vocabulary.txt", "index.bin", "documents.txt"] {
        let dir = tempfile::tempdir().unwrap();
        builder.save(dir.path()).unwrap();
        fs::remove_file(dir.path().join(victim)).unwrap();
        assert!(
            load_index(&IndexPaths::new(dir.path())).is_err(),
            "loading without {victim} should fail"
        );
    }
}

#[test]
fn truncated_posting_file_is_an_error() {
    let mut builder = seeded_corpus();
    let dir = tempfile::tempdir().unwrap();
    builder.save(dir.path()).unwrap();
    let paths = IndexPaths::new(dir.path());

    let bin = fs::read(paths.postings()).unwrap();
    fs::write(paths.postings(), &bin[..bin.len() - 2]).unwrap();
    assert!(load_index(&paths).is_err());
}
