use engine::stemmer::stem;
use engine::tokenizer::{analyze, tokenize};

#[test]
fn it_normalizes_and_stems() {
    let stems: Vec<String> = analyze("Running Runners RUN!").into_iter().map(|(_, s)| s).collect();
    assert_eq!(stems, vec!["run", "runner", "run"]);
}

#[test]
fn it_filters_stopwords() {
    let tokens = tokenize("The quick brown fox and the lazy dog");
    assert!(!tokens.contains(&"the".to_string()));
    assert!(!tokens.contains(&"and".to_string()));
    assert!(tokens.contains(&"quick".to_string()));
}

#[test]
fn surface_count_is_independent_of_stemming() {
    let pairs = analyze("Raiders ambush the vault dweller near the vault.");
    assert_eq!(pairs.len(), 6);
    let surfaces: Vec<&str> = pairs.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(
        surfaces,
        vec!["raiders", "ambush", "vault", "dweller", "near", "vault"]
    );
}

// Indexing stems through analyze(); the query side stems normalised tokens
// directly. Both must agree for every input, or recall silently breaks.
#[test]
fn document_and_query_paths_share_the_stemmer() {
    let samples = [
        "Running ponies gallop nationally",
        "effective generalization of policies",
        "don't touch the dweller's pip-boy",
        "Nuka-Cola Quantum glows",
    ];
    for text in samples {
        for (surface, doc_stem) in analyze(text) {
            assert_eq!(doc_stem, stem(&surface), "diverged on {surface:?}");
        }
    }
}

#[test]
fn operator_words_are_stopwords_in_document_text() {
    // "not" and "or" never reach the index, so they cannot collide with
    // their operator role on the query side.
    assert!(tokenize("to be or not to be").is_empty());
}
