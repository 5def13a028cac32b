//! Structural validation of a loaded index.
//!
//! The generator is supposed to guarantee these invariants; the checks
//! exist because the artifact arrives from an external toolchain and a
//! broken index silently degrades every downstream lookup.

use crate::index::types::SearchIndex;
use serde::Serialize;
use std::fmt;

/// A single invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationIssue {
    /// `filenames` is not positionally parallel to `docnames`
    FilenameCountMismatch { docnames: usize, filenames: usize },
    /// `titles` is not positionally parallel to `docnames`
    TitleCountMismatch { docnames: usize, titles: usize },
    /// A body term references a document index out of bounds
    TermOutOfBounds { term: String, doc: u32 },
    /// A title term references a document index out of bounds
    TitleTermOutOfBounds { term: String, doc: u32 },
    /// A term maps to no documents at all
    EmptyPostings { term: String },
    /// An empty string is used as a term
    EmptyTerm,
    /// An object references a document index out of bounds
    ObjectOutOfBounds { name: String, doc: u32 },
    /// An object references a type id absent from `objnames`/`objtypes`
    UnknownObjectType { name: String, type_id: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::FilenameCountMismatch {
                docnames,
                filenames,
            } => write!(
                f,
                "filenames has {} entries but docnames has {}",
                filenames, docnames
            ),
            ValidationIssue::TitleCountMismatch { docnames, titles } => {
                write!(f, "titles has {} entries but docnames has {}", titles, docnames)
            }
            ValidationIssue::TermOutOfBounds { term, doc } => {
                write!(f, "term \"{}\" references missing document {}", term, doc)
            }
            ValidationIssue::TitleTermOutOfBounds { term, doc } => {
                write!(f, "title term \"{}\" references missing document {}", term, doc)
            }
            ValidationIssue::EmptyPostings { term } => {
                write!(f, "term \"{}\" has no postings", term)
            }
            ValidationIssue::EmptyTerm => write!(f, "empty string used as a term"),
            ValidationIssue::ObjectOutOfBounds { name, doc } => {
                write!(f, "object \"{}\" references missing document {}", name, doc)
            }
            ValidationIssue::UnknownObjectType { name, type_id } => {
                write!(f, "object \"{}\" has unknown type id \"{}\"", name, type_id)
            }
        }
    }
}

/// Result of validating an index
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check every structural invariant of the index
pub fn validate(index: &SearchIndex) -> ValidationReport {
    let mut report = ValidationReport::default();
    let doc_count = index.docnames.len() as u32;

    if index.filenames.len() != index.docnames.len() {
        report.issues.push(ValidationIssue::FilenameCountMismatch {
            docnames: index.docnames.len(),
            filenames: index.filenames.len(),
        });
    }
    if index.titles.len() != index.docnames.len() {
        report.issues.push(ValidationIssue::TitleCountMismatch {
            docnames: index.docnames.len(),
            titles: index.titles.len(),
        });
    }

    check_postings(&index.terms, doc_count, &mut report, false);
    check_postings(&index.titleterms, doc_count, &mut report, true);

    for object in &index.objects {
        if object.doc >= doc_count {
            report.issues.push(ValidationIssue::ObjectOutOfBounds {
                name: object.name.clone(),
                doc: object.doc,
            });
        }
        if !index.objtypes.contains_key(&object.type_id) {
            report.issues.push(ValidationIssue::UnknownObjectType {
                name: object.name.clone(),
                type_id: object.type_id.clone(),
            });
        }
    }

    report
}

fn check_postings(
    terms: &rustc_hash::FxHashMap<String, Vec<u32>>,
    doc_count: u32,
    report: &mut ValidationReport,
    title: bool,
) {
    for (term, postings) in terms {
        if term.is_empty() {
            report.issues.push(ValidationIssue::EmptyTerm);
        }
        if postings.is_empty() {
            report.issues.push(ValidationIssue::EmptyPostings {
                term: term.clone(),
            });
        }
        for &doc in postings {
            if doc >= doc_count {
                let issue = if title {
                    ValidationIssue::TitleTermOutOfBounds {
                        term: term.clone(),
                        doc,
                    }
                } else {
                    ValidationIssue::TermOutOfBounds {
                        term: term.clone(),
                        doc,
                    }
                };
                report.issues.push(issue);
            }
        }
    }
}
