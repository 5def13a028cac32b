use crate::index::loader::load_index;
use crate::index::types::SearchIndex;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

/// Display statistics for an index artifact
pub fn show_stats(path: &Path) -> Result<()> {
    let index = load_index(path)?;

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Artifact:         {}", path.display());
    println!("Generator env:    {}", index.envversion);
    println!("Documents:        {}", index.doc_count());
    println!("Body terms:       {}", index.terms.len());
    println!("Title terms:      {}", index.titleterms.len());
    println!("Objects:          {}", index.objects.len());

    let postings = postings_summary(&index);
    println!();
    println!("Posting lists:");
    println!("  Total postings: {}", postings.total);
    println!("  Average length: {:.2}", postings.average);
    println!("  Longest:        {} (\"{}\")", postings.max_len, postings.max_term);

    // Objects per type
    if !index.objects.is_empty() {
        let mut type_counts: HashMap<String, usize> = HashMap::new();
        for object in &index.objects {
            let label = index
                .object_type(object)
                .map(|t| t.label.clone())
                .unwrap_or_else(|| format!("unknown ({})", object.type_id));
            *type_counts.entry(label).or_insert(0) += 1;
        }

        let mut sorted: Vec<_> = type_counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        println!();
        println!("Objects by type:");
        for (label, count) in sorted {
            println!("  {:25} {}", label, count);
        }
    }

    // Most widely used terms
    let mut by_freq: Vec<(&String, usize)> =
        index.terms.iter().map(|(t, p)| (t, p.len())).collect();
    by_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    println!();
    println!("Most frequent terms:");
    for (term, doc_freq) in by_freq.iter().take(10) {
        println!("  {:25} {} docs", term, doc_freq);
    }

    Ok(())
}

/// List every document with its title and source file
pub fn list_docs(path: &Path) -> Result<()> {
    let index = load_index(path)?;

    for doc in index.all_docs() {
        let docname = index.docname(doc).unwrap_or("?");
        let title = index.title(doc).unwrap_or("");
        let filename = index.filename(doc).unwrap_or("?");
        println!("{:4}  {:30} {:35} {}", doc, docname, title, filename);
    }

    Ok(())
}

/// List the object inventory, optionally restricted to one type or a
/// name substring
pub fn list_objects(path: &Path, type_filter: Option<&str>, name_filter: Option<&str>) -> Result<()> {
    let index = load_index(path)?;

    for object in &index.objects {
        let obj_type = index.object_type(object);
        if let Some(filter) = type_filter {
            match obj_type {
                Some(ty) if ty.matches_filter(filter) => {}
                _ => continue,
            }
        }
        if let Some(needle) = name_filter {
            if !object.name.contains(needle) {
                continue;
            }
        }

        let label = obj_type
            .map(|t| t.label.as_str())
            .unwrap_or(object.type_id.as_str());
        let page = index.html_path(object.doc).unwrap_or_default();
        println!("{:50} {:25} {}#{}", object.name, label, page, object.anchor);
    }

    Ok(())
}

struct PostingsSummary {
    total: usize,
    average: f64,
    max_len: usize,
    max_term: String,
}

fn postings_summary(index: &SearchIndex) -> PostingsSummary {
    let mut total = 0usize;
    let mut max_len = 0usize;
    let mut max_term = String::new();

    for (term, postings) in &index.terms {
        total += postings.len();
        if postings.len() > max_len || (postings.len() == max_len && *term < max_term) {
            max_len = postings.len();
            max_term = term.clone();
        }
    }

    let average = if index.terms.is_empty() {
        0.0
    } else {
        total as f64 / index.terms.len() as f64
    };

    PostingsSummary {
        total,
        average,
        max_len,
        max_term,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::loader::{index_from_value, parse_payload};

    #[test]
    fn test_postings_summary() {
        let index = index_from_value(
            parse_payload(r#"{docnames:["a","b"],terms:{gear:[0,1],echo:0}}"#).unwrap(),
        )
        .unwrap();
        let summary = postings_summary(&index);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.max_len, 2);
        assert_eq!(summary.max_term, "gear");
        assert!((summary.average - 1.5).abs() < f64::EPSILON);
    }
}
