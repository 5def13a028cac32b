use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Index of a document into `docnames`/`filenames`/`titles`
pub type DocId = u32;

/// Identifier of an object type in `objnames`/`objtypes` ("0", "1", ...)
pub type TypeId = String;

/// Environment version stamp of the generator.
///
/// Older generators emit a map of domain name to version, newer ones a
/// flat integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvVersion {
    Flat(u64),
    PerDomain(std::collections::BTreeMap<String, u64>),
}

impl Default for EnvVersion {
    fn default() -> Self {
        EnvVersion::Flat(0)
    }
}

impl std::fmt::Display for EnvVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvVersion::Flat(v) => write!(f, "{}", v),
            EnvVersion::PerDomain(map) => {
                let core = map.get("sphinx").copied().unwrap_or(0);
                write!(f, "{} ({} domains)", core, map.len())
            }
        }
    }
}

/// Object type descriptor from `objnames`/`objtypes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    /// Domain the type belongs to ("py", "c", "std", ...)
    pub domain: String,
    /// Short type name within the domain ("class", "function", ...)
    pub name: String,
    /// Human-readable label ("Python class")
    pub label: String,
}

impl ObjectType {
    /// Qualified form as stored in `objtypes`, e.g. "py:class"
    pub fn qualified(&self) -> String {
        format!("{}:{}", self.domain, self.name)
    }

    /// Check a `type:` filter value against this type.
    /// Accepts the qualified form ("py:class") or the bare name ("class").
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter.eq_ignore_ascii_case(&self.qualified()) || filter.eq_ignore_ascii_case(&self.name)
    }
}

/// One entry of the cross-reference inventory, flattened from the nested
/// `objects` map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full dotted name, prefix included ("pygears.typing.array.Array")
    pub name: String,
    /// Document the object is described on
    pub doc: DocId,
    /// Key into `objnames`/`objtypes`
    pub type_id: TypeId,
    /// Display priority assigned by the generator (0 = important, 2 = low)
    pub priority: i64,
    /// Resolved HTML anchor on the target page
    pub anchor: String,
}

impl ObjectEntry {
    /// Last dotted component of the full name ("Array")
    pub fn tail(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Resolve the anchor shorthand used by the generator.
///
/// An empty anchor means the full name is the anchor. A literal "-" means
/// the anchor is the type name joined to the full name, as in
/// "module-pygears.typing.array".
pub fn resolve_anchor(raw: &str, full_name: &str, type_name: &str) -> String {
    match raw {
        "" => full_name.to_string(),
        "-" => format!("{}-{}", type_name, full_name),
        other => other.to_string(),
    }
}

/// A fully loaded and normalized search index artifact.
///
/// Postings are sorted and deduplicated at load time; the nested object
/// tree is flattened with anchors resolved. The structure is immutable
/// once loaded: the artifact is regenerated wholesale by the
/// documentation build, never mutated by a consumer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchIndex {
    pub docnames: Vec<String>,
    pub filenames: Vec<String>,
    pub titles: Vec<String>,
    /// Stemmed body terms to postings
    pub terms: FxHashMap<String, Vec<DocId>>,
    /// Stemmed title terms to postings
    pub titleterms: FxHashMap<String, Vec<DocId>>,
    pub objects: Vec<ObjectEntry>,
    pub objtypes: FxHashMap<TypeId, ObjectType>,
    pub envversion: EnvVersion,
}

impl SearchIndex {
    /// Number of documents in the index
    pub fn doc_count(&self) -> usize {
        self.docnames.len()
    }

    pub fn docname(&self, doc: DocId) -> Option<&str> {
        self.docnames.get(doc as usize).map(String::as_str)
    }

    pub fn filename(&self, doc: DocId) -> Option<&str> {
        self.filenames.get(doc as usize).map(String::as_str)
    }

    pub fn title(&self, doc: DocId) -> Option<&str> {
        self.titles.get(doc as usize).map(String::as_str)
    }

    /// Rendered page path for a document ("riscv/setup.html")
    pub fn html_path(&self, doc: DocId) -> Option<String> {
        self.docname(doc).map(|d| format!("{}.html", d))
    }

    /// Postings for an exact body term
    pub fn term_docs(&self, term: &str) -> &[DocId] {
        self.terms.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Postings for an exact title term
    pub fn title_term_docs(&self, term: &str) -> &[DocId] {
        self.titleterms.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Type descriptor for an object entry
    pub fn object_type(&self, entry: &ObjectEntry) -> Option<&ObjectType> {
        self.objtypes.get(&entry.type_id)
    }

    /// All doc ids, for NOT evaluation
    pub fn all_docs(&self) -> impl Iterator<Item = DocId> + '_ {
        0..self.docnames.len() as DocId
    }
}
