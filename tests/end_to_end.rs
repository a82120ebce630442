use std::fs;

use amr_triples::corpus::{load_corpus, Dataset, Document};
use amr_triples::propbank::RoleEntry;
use amr_triples::{
    extract_triples, generate_amr_string_from_triples, Amr, Corpus, CorpusConverter, Node,
    RoleTable, Roleset, SentenceRecord, TextTriple, Var,
};
use pretty_assertions::assert_eq;

fn roleset(tags: &[(u8, &str)]) -> Roleset {
    Roleset::new(
        tags.iter()
            .map(|(n, f)| RoleEntry { arg_number: Some(*n), function_tag: f.to_string() })
            .collect(),
    )
}

fn role_table() -> RoleTable {
    let mut table = RoleTable::new();
    table.insert("want.01", roleset(&[(0, "PAG"), (1, "PPT")]));
    table.insert("go.02", roleset(&[(0, "PPT"), (4, "GOL")]));
    table.insert("believe.01", roleset(&[(0, "PAG"), (1, "PPT")]));
    table
}

/// "The boy wants to go."
fn boy_wants_to_go() -> Amr {
    Amr::new()
        .with_tokens(["The", "boy", "wants", "to", "go", "."])
        .instance("w", "want-01")
        .edge("w", ":ARG0", "b")
        .edge("w", ":ARG1", "g")
        .instance("b", "boy")
        .instance("g", "go-02")
        .edge("g", ":ARG0", "b")
        .align("w", "e.2")
        .align("b", "e.1")
        .align("g", "e.4")
        .with_reentrancy("b", 1)
}

#[test]
fn wanting_boy_yields_one_record_and_one_text_triple() {
    let amr = Amr::new()
        .instance("w", "want-01")
        .edge("w", ":ARG0", "b")
        .edge("w", ":ARG1", "g")
        .instance("b", "boy")
        .instance("g", "go-02")
        .align("w", "e.2")
        .align("b", "e.1");
    let table = role_table();

    let triples = extract_triples(&amr, &table).unwrap();
    assert_eq!(triples.len(), 1);
    let record = &triples[&Var::from("w")];
    assert_eq!(record.agent, Some(Node::Var(Var::from("b"))));
    assert_eq!(record.patients, vec![Node::Var(Var::from("g"))]);

    let texts = generate_amr_string_from_triples(&amr, &triples).unwrap();
    assert_eq!(
        texts,
        vec![TextTriple {
            left: "(b / boy)".to_string(),
            predicate: "want-01".to_string(),
            right: "(g / go-02)".to_string(),
        }]
    );
}

#[test]
fn shared_argument_is_rendered_inside_each_patient() {
    let amr = boy_wants_to_go();
    let table = role_table();
    let triples = extract_triples(&amr, &table).unwrap();
    let texts = generate_amr_string_from_triples(&amr, &triples).unwrap();

    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0].left, "(b / boy)");
    assert_eq!(texts[0].right, "(g / go-02 \n    :ARG0 (b / boy))");
    // go-02 has no agent role, so the boy is its patient
    assert_eq!(
        texts[1],
        TextTriple {
            left: String::new(),
            predicate: "go-02".to_string(),
            right: "(b / boy)".to_string(),
        }
    );
}

#[test]
fn conversion_is_idempotent() {
    let amr = boy_wants_to_go();
    let table = role_table();

    let first = extract_triples(&amr, &table).unwrap();
    let second = extract_triples(&amr, &table).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        generate_amr_string_from_triples(&amr, &first).unwrap(),
        generate_amr_string_from_triples(&amr, &second).unwrap()
    );
}

#[test]
fn forward_and_inverse_edges_merge_into_one_record() {
    // (b / believe-01 :ARG1 (g / go-02) ...) where the believer is attached inversely
    let amr = Amr::new()
        .instance("b", "believe-01")
        .edge("b", ":ARG1", "g")
        .instance("g", "go-02")
        .instance("p", "person")
        .edge("p", ":ARG0-of", "b")
        .align("b", "e.1");
    let triples = extract_triples(&amr, &role_table()).unwrap();

    assert_eq!(triples.len(), 1);
    let record = &triples[&Var::from("b")];
    assert_eq!(record.agent, Some(Node::Var(Var::from("p"))));
    assert_eq!(record.patients, vec![Node::Var(Var::from("g"))]);
    assert!(triples.values().all(|r| r.agent.is_some() || !r.patients.is_empty()));

    let texts = generate_amr_string_from_triples(&amr, &triples).unwrap();
    assert_eq!(
        texts[0].left,
        "(p / person \n    :ARG0-of (b / believe-01 \n        :ARG1 (g / go-02)))"
    );
}

#[test]
fn corpus_round_trip_through_json_and_cache() {
    let mut document = Document::new();
    document.insert(
        "1".to_string(),
        SentenceRecord::new(
            ["The", "boy", "wants", "to", "go", "."].map(String::from).to_vec(),
            "(w / want-01 :ARG0 (b / boy) :ARG1 (g / go-02 :ARG0 b))",
            boy_wants_to_go(),
        ),
    );
    let mut dataset = Dataset::new();
    dataset.insert("bolt12_07_4800".to_string(), document);
    let mut corpus = Corpus::new();
    corpus.insert("dev".to_string(), dataset);

    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.json");
    fs::write(&corpus_path, serde_json::to_string_pretty(&corpus).unwrap()).unwrap();

    let table = role_table();
    let loaded = load_corpus(&corpus_path).unwrap();
    let mut converter = CorpusConverter::new(loaded, &table, dir.path());
    let summary = converter.update_amr_corpus_with_triples();
    assert_eq!(summary.converted, 1);
    assert!(summary.failures.is_empty());
    converter.save_data().unwrap();

    let mut cached = CorpusConverter::new(Corpus::new(), &table, dir.path());
    assert!(cached.is_file_exist());
    cached.load_data().unwrap();
    let record = &cached.corpus()["dev"]["bolt12_07_4800"]["1"];
    assert_eq!(record.amr_string_triples.len(), 2);
    assert_eq!(record.triples.as_ref().unwrap().len(), 2);

    let files = cached.write_amr_string_to_file().unwrap();
    let written = fs::read_to_string(&files[0]).unwrap();
    assert_eq!(written, "(b / boy)\n(g / go-02 \n    :ARG0 (b / boy))\n(b / boy)\n");
}
