use crate::index::types::{DocId, SearchIndex};
use crate::query::parser::{Query, QueryNode, SortOrder};
use crate::query::scorer::{MatchKind, Scorer, ScoringWeights, TermMatch};
use crate::utils::{query_words, QueryWord};
use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use regex::Regex;
use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// What a search hit points at
#[derive(Debug, Clone, Serialize)]
pub enum HitKind {
    /// A documentation page matched via its terms
    Document,
    /// An entry of the object inventory, anchored within a page
    Object { name: String, type_label: String },
}

/// One ranked search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub doc: DocId,
    pub docname: String,
    pub title: String,
    /// Rendered-page link, anchor included for object hits
    pub link: String,
    pub kind: HitKind,
    pub score: f32,
    pub matched: Vec<TermMatch>,
}

/// Query executor over a loaded index
pub struct QueryExecutor<'a> {
    index: &'a SearchIndex,
    scorer: Scorer,
}

/// Evaluation state for one AST node: the matching documents and the
/// per-document term matches that produced them
#[derive(Default)]
struct Eval {
    docs: RoaringBitmap,
    matches: FxHashMap<DocId, Vec<TermMatch>>,
}

impl Eval {
    fn merge_matches(&mut self, other: FxHashMap<DocId, Vec<TermMatch>>) {
        for (doc, mut terms) in other {
            self.matches.entry(doc).or_default().append(&mut terms);
        }
    }
}

impl<'a> QueryExecutor<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self {
            index,
            scorer: Scorer::with_defaults(),
        }
    }

    /// Create executor with custom scoring weights
    pub fn with_scoring_weights(index: &'a SearchIndex, weights: ScoringWeights) -> Self {
        Self {
            index,
            scorer: Scorer::new(weights),
        }
    }

    /// Execute a query and return ranked hits
    pub fn execute(&self, query: &Query) -> Result<Vec<SearchHit>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let doc_matcher = match &query.filters.doc {
            Some(glob) => Some(
                Glob::new(glob)
                    .with_context(|| format!("Invalid doc glob: {}", glob))?
                    .compile_matcher(),
            ),
            None => None,
        };

        let mut hits = Vec::new();

        // Term hits
        let eval = self.eval_node(&query.root, query.filters.titles_only)?;
        for doc in &eval.docs {
            let docname = match self.index.docname(doc) {
                Some(d) => d,
                None => continue,
            };
            if let Some(ref matcher) = doc_matcher {
                if !matcher.is_match(docname) {
                    continue;
                }
            }

            let matched = eval.matches.get(&doc).cloned().unwrap_or_default();
            let score = self.scorer.score_document(&matched);
            hits.push(SearchHit {
                doc,
                docname: docname.to_string(),
                title: self.index.title(doc).unwrap_or("").to_string(),
                link: self.index.html_path(doc).unwrap_or_default(),
                kind: HitKind::Document,
                score,
                matched,
            });
        }

        // Object hits
        hits.extend(self.object_hits(query, doc_matcher.as_ref()));

        sort_hits(&mut hits, query.options.sort);
        if query.options.limit > 0 {
            hits.truncate(query.options.limit);
        }

        Ok(hits)
    }

    fn eval_node(&self, node: &QueryNode, titles_only: bool) -> Result<Eval> {
        match node {
            QueryNode::Empty => Ok(self.all_docs_eval()),

            QueryNode::Word(word) => Ok(self.eval_word(&QueryWord::new(word), 1.0, titles_only)),

            QueryNode::BoostedWord { word, boost } => {
                Ok(self.eval_word(&QueryWord::new(word), *boost, titles_only))
            }

            QueryNode::Phrase(text) => {
                let words = query_words(text);
                if words.is_empty() {
                    return Ok(Eval::default());
                }
                let evals: Vec<Eval> = words
                    .iter()
                    .map(|w| self.eval_word(w, 1.0, titles_only))
                    .collect();
                Ok(intersect_evals(evals))
            }

            QueryNode::Regex(pattern) => {
                let re = Regex::new(pattern)
                    .with_context(|| format!("Invalid regex: {}", pattern))?;
                Ok(self.eval_regex(&re, titles_only))
            }

            QueryNode::And(nodes) => {
                let evals = nodes
                    .iter()
                    .map(|n| self.eval_node(n, titles_only))
                    .collect::<Result<Vec<_>>>()?;
                Ok(intersect_evals(evals))
            }

            QueryNode::Or(nodes) => {
                let mut union = Eval::default();
                for node in nodes {
                    let eval = self.eval_node(node, titles_only)?;
                    union.docs |= eval.docs;
                    union.merge_matches(eval.matches);
                }
                Ok(union)
            }

            QueryNode::Not(inner) => {
                let excluded = self.eval_node(inner, titles_only)?;
                let mut docs = RoaringBitmap::new();
                for doc in self.index.all_docs() {
                    if !excluded.docs.contains(doc) {
                        docs.insert(doc);
                    }
                }
                Ok(Eval {
                    docs,
                    matches: FxHashMap::default(),
                })
            }
        }
    }

    /// Look a single word up in the term dictionaries.
    ///
    /// The stemmed form is tried exactly first; the raw form covers terms
    /// the generator stored unstemmed (hex literals, option names). When
    /// an exact lookup misses and the word is long enough, dictionary
    /// terms containing it as a substring match partially at a lower
    /// weight.
    fn eval_word(&self, word: &QueryWord, boost: f32, titles_only: bool) -> Eval {
        let mut eval = Eval::default();
        if word.raw.is_empty() {
            return eval;
        }

        if !titles_only {
            self.lookup_dictionary(
                &self.index.terms,
                word,
                boost,
                MatchKind::Term,
                MatchKind::PartialTerm,
                &mut eval,
            );
        }
        self.lookup_dictionary(
            &self.index.titleterms,
            word,
            boost,
            MatchKind::Title,
            MatchKind::PartialTitle,
            &mut eval,
        );

        eval
    }

    fn lookup_dictionary(
        &self,
        dictionary: &FxHashMap<String, Vec<DocId>>,
        word: &QueryWord,
        boost: f32,
        exact_kind: MatchKind,
        partial_kind: MatchKind,
        eval: &mut Eval,
    ) {
        let mut exact_hit = false;

        for needle in [word.stemmed.as_str(), word.raw.as_str()] {
            if let Some(postings) = dictionary.get(needle) {
                exact_hit = true;
                record_postings(eval, postings, &word.raw, needle, exact_kind, boost);
            }
            if word.stemmed == word.raw {
                break;
            }
        }

        // Partial match only when nothing matched exactly and the word is
        // long enough to be selective
        if !exact_hit && word.stemmed.len() > 2 {
            for (term, postings) in dictionary {
                if term.contains(word.stemmed.as_str()) || term.contains(word.raw.as_str()) {
                    record_postings(eval, postings, &word.raw, term, partial_kind, boost);
                }
            }
        }
    }

    fn eval_regex(&self, re: &Regex, titles_only: bool) -> Eval {
        let mut eval = Eval::default();

        if !titles_only {
            for (term, postings) in &self.index.terms {
                if re.is_match(term) {
                    record_postings(&mut eval, postings, re.as_str(), term, MatchKind::Term, 1.0);
                }
            }
        }
        for (term, postings) in &self.index.titleterms {
            if re.is_match(term) {
                record_postings(&mut eval, postings, re.as_str(), term, MatchKind::Title, 1.0);
            }
        }

        eval
    }

    fn all_docs_eval(&self) -> Eval {
        let mut docs = RoaringBitmap::new();
        for doc in self.index.all_docs() {
            docs.insert(doc);
        }
        Eval {
            docs,
            matches: FxHashMap::default(),
        }
    }

    /// Match positive query words against the object inventory
    fn object_hits(&self, query: &Query, doc_matcher: Option<&GlobMatcher>) -> Vec<SearchHit> {
        let mut words = Vec::new();
        collect_positive_words(&query.root, 1.0, &mut words);
        if words.is_empty() {
            return Vec::new();
        }

        // Best-scoring word per object
        let mut best: FxHashMap<usize, (f32, &QueryWord)> = FxHashMap::default();

        for (word, boost) in &words {
            if word.raw.len() < 2 {
                continue;
            }
            for (idx, object) in self.index.objects.iter().enumerate() {
                let name_lower = object.name.to_lowercase();
                if !name_lower.contains(word.raw.as_str()) {
                    continue;
                }
                if let Some(ref filter) = query.filters.obj_type {
                    match self.index.object_type(object) {
                        Some(ty) if ty.matches_filter(filter) => {}
                        _ => continue,
                    }
                }

                let exact_tail = object.tail().eq_ignore_ascii_case(&word.raw)
                    || name_lower == word.raw;
                let score = self.scorer.score_object(exact_tail, object.priority, *boost);

                match best.get(&idx) {
                    Some((existing, _)) if *existing >= score => {}
                    _ => {
                        best.insert(idx, (score, word));
                    }
                }
            }
        }

        let mut hits = Vec::new();
        for (idx, (score, word)) in best {
            let object = &self.index.objects[idx];
            let docname = match self.index.docname(object.doc) {
                Some(d) => d,
                None => continue,
            };
            if let Some(matcher) = doc_matcher {
                if !matcher.is_match(docname) {
                    continue;
                }
            }

            let type_label = self
                .index
                .object_type(object)
                .map(|t| t.label.clone())
                .unwrap_or_else(|| object.type_id.clone());
            let link = match self.index.html_path(object.doc) {
                Some(page) => format!("{}#{}", page, object.anchor),
                None => continue,
            };

            hits.push(SearchHit {
                doc: object.doc,
                docname: docname.to_string(),
                title: self.index.title(object.doc).unwrap_or("").to_string(),
                link,
                kind: HitKind::Object {
                    name: object.name.clone(),
                    type_label,
                },
                score,
                matched: vec![TermMatch {
                    word: word.raw.clone(),
                    term: object.name.clone(),
                    kind: MatchKind::Term,
                    boost: 1.0,
                }],
            });
        }

        hits
    }
}

fn record_postings(
    eval: &mut Eval,
    postings: &[DocId],
    word: &str,
    term: &str,
    kind: MatchKind,
    boost: f32,
) {
    for &doc in postings {
        eval.docs.insert(doc);
        eval.matches.entry(doc).or_default().push(TermMatch {
            word: word.to_string(),
            term: term.to_string(),
            kind,
            boost,
        });
    }
}

/// Intersect evaluations, keeping only matches of surviving documents
fn intersect_evals(evals: Vec<Eval>) -> Eval {
    let mut iter = evals.into_iter();
    let mut result = match iter.next() {
        Some(first) => first,
        None => return Eval::default(),
    };

    for eval in iter {
        result.docs &= eval.docs;
        result.merge_matches(eval.matches);
    }
    result.matches.retain(|doc, _| result.docs.contains(*doc));
    result
}

/// Collect words contributing positively (NOT subtrees excluded), with
/// their boosts
fn collect_positive_words(node: &QueryNode, boost: f32, out: &mut Vec<(QueryWord, f32)>) {
    match node {
        QueryNode::Word(word) => out.push((QueryWord::new(word), boost)),
        QueryNode::BoostedWord { word, boost: b } => out.push((QueryWord::new(word), *b)),
        QueryNode::Phrase(text) => {
            for word in query_words(text) {
                out.push((word, boost));
            }
        }
        QueryNode::And(nodes) | QueryNode::Or(nodes) => {
            for n in nodes {
                collect_positive_words(n, boost, out);
            }
        }
        QueryNode::Not(_) | QueryNode::Regex(_) | QueryNode::Empty => {}
    }
}

fn sort_hits(hits: &mut [SearchHit], order: SortOrder) {
    match order {
        SortOrder::Score => {
            hits.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.docname.cmp(&b.docname))
                    .then_with(|| a.link.cmp(&b.link))
            });
        }
        SortOrder::Doc => {
            hits.sort_by(|a, b| a.docname.cmp(&b.docname).then_with(|| a.link.cmp(&b.link)));
        }
        SortOrder::Title => {
            hits.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.link.cmp(&b.link)));
        }
    }
}
