/// Parsed query representation
#[derive(Debug, Clone)]
pub struct Query {
    pub root: QueryNode,
    pub filters: QueryFilters,
    pub options: QueryOptions,
}

/// Query AST node
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// Single search word
    Word(String),
    /// Search word with a score boost
    BoostedWord { word: String, boost: f32 },
    /// Quoted phrase: every word must match the same document
    Phrase(String),
    /// Regex matched against the term dictionary
    Regex(String),
    /// Boolean AND (all must match)
    And(Vec<QueryNode>),
    /// Boolean OR (any can match)
    Or(Vec<QueryNode>),
    /// Boolean NOT (exclude matches)
    Not(Box<QueryNode>),
    /// Empty query
    Empty,
}

/// Query filters
#[derive(Debug, Clone, Default)]
pub struct QueryFilters {
    /// Docname glob (doc:riscv/*)
    pub doc: Option<String>,
    /// Object type filter (type:py:class or type:class)
    pub obj_type: Option<String>,
    /// Restrict term lookup to title terms (in:titles)
    pub titles_only: bool,
}

impl QueryFilters {
    /// Check if any filter is set
    pub fn has_any(&self) -> bool {
        self.doc.is_some() || self.obj_type.is_some() || self.titles_only
    }
}

/// Query options
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Sort order
    pub sort: SortOrder,
    /// Maximum results (0 = unlimited)
    pub limit: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            sort: SortOrder::Score,
            limit: 20,
        }
    }
}

/// Sort order for results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Score,
    Doc,
    Title,
}

/// Parse a query string into a Query structure
pub fn parse_query(input: &str) -> Query {
    let mut parser = QueryParser::new(input);
    parser.parse()
}

/// Query parser
struct QueryParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    filters: QueryFilters,
    options: QueryOptions,
}

impl<'a> QueryParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            filters: QueryFilters::default(),
            options: QueryOptions::default(),
        }
    }

    fn parse(&mut self) -> Query {
        let root = self.parse_or();
        Query {
            root,
            filters: self.filters.clone(),
            options: self.options.clone(),
        }
    }

    fn parse_or(&mut self) -> QueryNode {
        let mut nodes = vec![self.parse_and()];

        self.skip_whitespace();
        while self.consume_char('|') {
            self.skip_whitespace();
            nodes.push(self.parse_and());
            self.skip_whitespace();
        }

        let mut nodes: Vec<_> = nodes
            .into_iter()
            .filter(|n| !matches!(n, QueryNode::Empty))
            .collect();

        match nodes.len() {
            0 => QueryNode::Empty,
            1 => nodes.pop().unwrap(),
            _ => QueryNode::Or(nodes),
        }
    }

    fn parse_and(&mut self) -> QueryNode {
        let mut nodes = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_eof() || self.peek_char() == Some('|') {
                break;
            }
            if self.peek_char() == Some(')') {
                if self.depth > 0 {
                    break;
                }
                // Stray closing paren in a hand-typed query, skip it
                self.advance();
                continue;
            }

            let node = self.parse_unary();
            if !matches!(node, QueryNode::Empty) {
                nodes.push(node);
            }
        }

        match nodes.len() {
            0 => QueryNode::Empty,
            1 => nodes.pop().unwrap(),
            _ => QueryNode::And(nodes),
        }
    }

    fn parse_unary(&mut self) -> QueryNode {
        self.skip_whitespace();

        if self.consume_char('-') {
            let inner = self.parse_primary();
            if matches!(inner, QueryNode::Empty) {
                return QueryNode::Empty;
            }
            return QueryNode::Not(Box::new(inner));
        }

        // Boost prefix ^word or ^N:word (^foo, ^2:foo, ^1.5:foo)
        if self.consume_char('^') {
            let mut boost = 2.0_f32;
            let boost_start = self.pos;

            while !self.is_eof() {
                let ch = self.peek_char().unwrap();
                if ch.is_ascii_digit() || ch == '.' {
                    self.advance();
                } else if ch == ':' {
                    let boost_str = &self.input[boost_start..self.pos];
                    if let Ok(b) = boost_str.parse::<f32>() {
                        boost = b;
                    }
                    self.advance(); // consume ':'
                    break;
                } else {
                    // No explicit boost value, reset position
                    self.pos = boost_start;
                    break;
                }
            }

            let inner = self.parse_primary();
            return match inner {
                QueryNode::Word(word) => QueryNode::BoostedWord { word, boost },
                other => other, // Can't boost complex nodes, return as-is
            };
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> QueryNode {
        self.skip_whitespace();

        // Parenthesized expression
        if self.consume_char('(') {
            self.depth += 1;
            let node = self.parse_or();
            if self.consume_char(')') {
                self.depth -= 1;
            }
            return node;
        }

        // Quoted phrase
        if self.peek_char() == Some('"') {
            return self.parse_phrase();
        }

        // Regex
        if self.remaining().starts_with("re:/") {
            return self.parse_regex();
        }

        // Field filter or plain word
        self.parse_word()
    }

    fn parse_phrase(&mut self) -> QueryNode {
        self.consume_char('"');
        let start = self.pos;

        while !self.is_eof() && self.peek_char() != Some('"') {
            self.advance();
        }

        let phrase = self.input[start..self.pos].to_string();
        self.consume_char('"');

        // A phrase of nothing but stopwords can never match
        if crate::utils::query_words(&phrase).is_empty() {
            QueryNode::Empty
        } else {
            QueryNode::Phrase(phrase)
        }
    }

    fn parse_regex(&mut self) -> QueryNode {
        // Skip "re:/"
        self.pos += 4;
        let start = self.pos;

        // Find closing /
        while !self.is_eof() && self.peek_char() != Some('/') {
            self.advance();
        }

        let pattern = self.input[start..self.pos].to_string();
        self.consume_char('/');

        QueryNode::Regex(pattern)
    }

    fn parse_word(&mut self) -> QueryNode {
        let start = self.pos;

        // Field prefixes are plain identifiers followed by ':'
        while !self.is_eof() {
            let ch = self.peek_char().unwrap();
            if ch.is_alphanumeric() || ch == '_' || ch == ':' {
                self.advance();
                if ch == ':' {
                    let field = &self.input[start..self.pos - 1];
                    if is_known_field(field) {
                        return self.parse_field(field);
                    }
                    // Unknown field: fall through and read the rest as a word
                }
            } else if ch == '.' {
                // Dotted object names are words, not fields
                self.advance();
            } else {
                break;
            }
        }

        let word = self.input[start..self.pos].to_string();
        if word.is_empty() {
            // Consume any non-whitespace run so parsing always advances
            while !self.is_eof() {
                let ch = self.peek_char().unwrap();
                if ch.is_whitespace() || ch == '|' || ch == ')' || ch == '(' {
                    break;
                }
                self.advance();
            }
            let word = self.input[start..self.pos].to_string();
            if word.is_empty() {
                return QueryNode::Empty;
            }
            return word_node(word);
        }

        word_node(word)
    }

    fn parse_field(&mut self, field: &str) -> QueryNode {
        let value_start = self.pos;

        // Read value until whitespace or a grouping char
        while !self.is_eof() {
            let ch = self.peek_char().unwrap();
            if ch.is_whitespace() || ch == '|' || ch == ')' {
                break;
            }
            self.advance();
        }

        let value = self.input[value_start..self.pos].to_string();

        match field.to_lowercase().as_str() {
            "doc" => {
                self.filters.doc = Some(value);
                QueryNode::Empty
            }
            "type" => {
                self.filters.obj_type = Some(value);
                QueryNode::Empty
            }
            "in" => {
                if value.eq_ignore_ascii_case("titles") {
                    self.filters.titles_only = true;
                }
                QueryNode::Empty
            }
            "sort" => {
                self.parse_sort(&value);
                QueryNode::Empty
            }
            "top" => {
                if let Ok(n) = value.parse() {
                    self.options.limit = n;
                }
                QueryNode::Empty
            }
            _ => QueryNode::Word(format!("{}:{}", field, value)),
        }
    }

    fn parse_sort(&mut self, value: &str) {
        self.options.sort = match value.to_lowercase().as_str() {
            "doc" | "docname" | "page" => SortOrder::Doc,
            "title" => SortOrder::Title,
            _ => SortOrder::Score,
        };
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.peek_char().map(|c| c.is_whitespace()).unwrap_or(false) {
            self.advance();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn remaining(&self) -> &str {
        &self.input[self.pos..]
    }
}

/// Stopwords never made it into the index, so they are dropped here the
/// same way the generator dropped them
fn word_node(word: String) -> QueryNode {
    if crate::utils::is_stopword(&word.to_lowercase()) {
        QueryNode::Empty
    } else {
        QueryNode::Word(word)
    }
}

fn is_known_field(field: &str) -> bool {
    matches!(
        field.to_lowercase().as_str(),
        "doc" | "type" | "in" | "sort" | "top"
    )
}

impl Query {
    /// Check if query is empty (no search term AND no filters)
    pub fn is_empty(&self) -> bool {
        matches!(self.root, QueryNode::Empty) && !self.filters.has_any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_query() {
        let q = parse_query("echo");
        assert!(matches!(q.root, QueryNode::Word(s) if s == "echo"));
    }

    #[test]
    fn test_phrase_query() {
        let q = parse_query("\"quick introduction\"");
        assert!(matches!(q.root, QueryNode::Phrase(s) if s == "quick introduction"));
    }

    #[test]
    fn test_and_query() {
        let q = parse_query("gear echo");
        assert!(matches!(q.root, QueryNode::And(ref nodes) if nodes.len() == 2));
    }

    #[test]
    fn test_or_query() {
        let q = parse_query("gear | echo");
        assert!(matches!(q.root, QueryNode::Or(ref nodes) if nodes.len() == 2));
    }

    #[test]
    fn test_not_query() {
        let q = parse_query("-install");
        assert!(matches!(q.root, QueryNode::Not(_)));
    }

    #[test]
    fn test_regex() {
        let q = parse_query("re:/gear.*/");
        assert!(matches!(q.root, QueryNode::Regex(s) if s == "gear.*"));
    }

    #[test]
    fn test_dotted_word_is_not_a_field() {
        let q = parse_query("pygears.typing.Uint");
        assert!(matches!(q.root, QueryNode::Word(s) if s == "pygears.typing.Uint"));
    }

    #[test]
    fn test_doc_filter() {
        let q = parse_query("doc:riscv/* simulator");
        assert_eq!(q.filters.doc, Some("riscv/*".to_string()));
        assert!(matches!(q.root, QueryNode::Word(s) if s == "simulator"));
    }

    #[test]
    fn test_type_filter() {
        let q = parse_query("type:py:class Uint");
        assert_eq!(q.filters.obj_type, Some("py:class".to_string()));
    }

    #[test]
    fn test_titles_only_filter() {
        let q = parse_query("in:titles typing");
        assert!(q.filters.titles_only);
        assert!(matches!(q.root, QueryNode::Word(s) if s == "typing"));
    }

    #[test]
    fn test_sort_option() {
        assert_eq!(parse_query("sort:doc x").options.sort, SortOrder::Doc);
        assert_eq!(parse_query("sort:title x").options.sort, SortOrder::Title);
        assert_eq!(parse_query("sort:score x").options.sort, SortOrder::Score);
    }

    #[test]
    fn test_top_limit() {
        let q = parse_query("top:5 gear");
        assert_eq!(q.options.limit, 5);
    }

    #[test]
    fn test_boost_simple() {
        let q = parse_query("^typing");
        assert!(
            matches!(q.root, QueryNode::BoostedWord { ref word, boost } if word == "typing" && boost == 2.0)
        );
    }

    #[test]
    fn test_boost_with_value() {
        let q = parse_query("^3:typing");
        assert!(
            matches!(q.root, QueryNode::BoostedWord { ref word, boost } if word == "typing" && boost == 3.0)
        );
    }

    #[test]
    fn test_boost_float_value() {
        let q = parse_query("^1.5:gear");
        assert!(
            matches!(q.root, QueryNode::BoostedWord { ref word, boost } if word == "gear" && (boost - 1.5).abs() < 0.01)
        );
    }

    #[test]
    fn test_stray_close_paren_skipped() {
        let q = parse_query("gear ) echo");
        match q.root {
            QueryNode::And(nodes) => {
                assert_eq!(nodes.len(), 2);
                assert!(matches!(nodes[1], QueryNode::Word(ref s) if s == "echo"));
            }
            other => panic!("Expected And, got {:?}", other),
        }
        let q = parse_query(") gear");
        assert!(matches!(q.root, QueryNode::Word(s) if s == "gear"));
    }

    #[test]
    fn test_parenthesized_group() {
        let q = parse_query("(gear | echo) typing");
        match q.root {
            QueryNode::And(nodes) => {
                assert!(matches!(nodes[0], QueryNode::Or(_)));
                assert!(matches!(nodes[1], QueryNode::Word(ref s) if s == "typing"));
            }
            other => panic!("Expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_only_query_not_empty() {
        let q = parse_query("doc:riscv/*");
        assert!(matches!(q.root, QueryNode::Empty));
        assert!(!q.is_empty());
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("   ").is_empty());
    }

    #[test]
    fn test_stopwords_dropped() {
        let q = parse_query("introduction to gears");
        match q.root {
            QueryNode::And(nodes) => assert_eq!(nodes.len(), 2),
            other => panic!("Expected And, got {:?}", other),
        }
        assert!(parse_query("the").is_empty());
    }

    #[test]
    fn test_stopword_only_phrase_dropped() {
        assert!(parse_query("\"the\"").is_empty());
        assert!(parse_query("\"to the\"").is_empty());
        // Stopwords inside a real phrase don't drop the phrase itself
        let q = parse_query("\"the gear echo\"");
        assert!(matches!(q.root, QueryNode::Phrase(s) if s == "the gear echo"));
    }

    #[test]
    fn test_unknown_field_treated_as_word() {
        let q = parse_query("size:100");
        assert!(matches!(q.root, QueryNode::Word(ref s) if s == "size:100"));
    }

    #[test]
    fn test_combined() {
        let q = parse_query("doc:riscv/* type:function sort:title top:3 -setup simulator");
        assert_eq!(q.filters.doc, Some("riscv/*".to_string()));
        assert_eq!(q.filters.obj_type, Some("function".to_string()));
        assert_eq!(q.options.sort, SortOrder::Title);
        assert_eq!(q.options.limit, 3);
        match &q.root {
            QueryNode::And(nodes) => {
                assert!(nodes.iter().any(|n| matches!(n, QueryNode::Not(_))));
                assert!(nodes
                    .iter()
                    .any(|n| matches!(n, QueryNode::Word(s) if s == "simulator")));
            }
            other => panic!("Expected And, got {:?}", other),
        }
    }
}
