//! End-to-end tests against a real-shaped generated artifact.

use sidx::index::types::EnvVersion;
use sidx::index::validate::validate;
use sidx::index::load_index;
use sidx::query::{parse_query, HitKind, QueryExecutor, SearchHit};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/searchindex.js")
}

fn doc_hits(hits: &[SearchHit]) -> Vec<&SearchHit> {
    hits.iter()
        .filter(|h| matches!(h.kind, HitKind::Document))
        .collect()
}

#[test]
fn loads_generated_artifact() {
    let index = load_index(&fixture_path()).unwrap();

    assert_eq!(index.doc_count(), 8);
    assert_eq!(index.docname(0), Some("blog/2021/verilator"));
    assert_eq!(index.filename(3), Some("install.rst"));
    assert_eq!(index.title(2), Some("Welcome to PyGears"));
    assert!(index.terms.contains_key("arrai"));
    assert_eq!(index.objects.len(), 6);

    match &index.envversion {
        EnvVersion::PerDomain(domains) => {
            assert_eq!(domains.get("sphinx"), Some(&56));
            assert_eq!(domains.get("sphinx.domains.python"), Some(&2));
        }
        other => panic!("Expected per-domain envversion, got {:?}", other),
    }
}

#[test]
fn artifact_passes_validation() {
    let index = load_index(&fixture_path()).unwrap();
    let report = validate(&index);
    assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
}

#[test]
fn plural_query_finds_stemmed_terms() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    // The artifact stores "arrai", the stemmer's rendition of "array"
    let hits = executor.execute(&parse_query("arrays")).unwrap();
    let docs = doc_hits(&hits);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].docname, "reference/typing");
    assert_eq!(docs[1].docname, "tutorial");
}

#[test]
fn title_match_ranks_first() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    let hits = executor.execute(&parse_query("typing")).unwrap();
    let docs = doc_hits(&hits);
    assert_eq!(docs[0].docname, "reference/typing");
    assert!(docs[0].score > docs[1].score);
}

#[test]
fn object_anchors_resolve_shorthand() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    let hits = executor.execute(&parse_query("array")).unwrap();

    let module = hits
        .iter()
        .find(|h| matches!(&h.kind, HitKind::Object { name, .. } if name == "pygears.typing.array"))
        .expect("module object hit");
    assert_eq!(module.link, "reference/typing.html#module-pygears.typing.array");

    let class = hits
        .iter()
        .find(|h| {
            matches!(&h.kind, HitKind::Object { name, .. } if name == "pygears.typing.array.Array")
        })
        .expect("class object hit");
    assert_eq!(class.link, "reference/typing.html#pygears.typing.array.Array");

    // Module priority 0 outranks the normal-priority class
    assert!(module.score > class.score);
}

#[test]
fn boolean_operators_combine() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    let hits = executor.execute(&parse_query("gear -echo")).unwrap();
    let names: Vec<&str> = doc_hits(&hits).iter().map(|h| h.docname.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"reference/gears"));
    assert!(names.contains(&"tutorial"));

    let hits = executor.execute(&parse_query("riscv | sound")).unwrap();
    let names: Vec<&str> = doc_hits(&hits).iter().map(|h| h.docname.as_str()).collect();
    assert!(names.contains(&"blog/2021/verilator"));
    assert!(names.contains(&"echo"));
}

#[test]
fn doc_glob_restricts_pages() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    let hits = executor
        .execute(&parse_query("doc:reference/* connect"))
        .unwrap();
    for hit in &hits {
        assert!(hit.docname.starts_with("reference/"));
    }
    assert!(doc_hits(&hits).iter().any(|h| h.docname == "reference/gears"));
}

#[test]
fn unstemmed_literal_terms_survive() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    // Hex literals are stored raw by the generator
    let hits = executor.execute(&parse_query("0x13")).unwrap();
    let docs = doc_hits(&hits);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].docname, "blog/2021/verilator");
}

#[test]
fn sort_and_limit_options() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    let hits = executor.execute(&parse_query("top:2 sort:doc typing")).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].docname, "reference/gears");
}

#[test]
fn hits_serialize_for_scripting() {
    let index = load_index(&fixture_path()).unwrap();
    let executor = QueryExecutor::new(&index);

    let hits = executor.execute(&parse_query("verilator")).unwrap();
    let value = serde_json::to_value(&hits).unwrap();

    let array = value.as_array().unwrap();
    assert!(!array.is_empty());
    let first = &array[0];
    assert!(first.get("score").unwrap().is_number());
    assert_eq!(
        first.get("link").unwrap().as_str(),
        Some("blog/2021/verilator.html")
    );
    assert!(first.get("matched").unwrap().is_array());
}
