pub mod executor;
pub mod parser;
pub mod scorer;

pub use executor::QueryExecutor;
pub use parser::parse_query;
// Re-exports for public API
#[allow(unused_imports)]
pub use executor::{HitKind, SearchHit};
#[allow(unused_imports)]
pub use parser::{Query, QueryNode, SortOrder};
#[allow(unused_imports)]
pub use scorer::{MatchKind, Scorer, ScoringWeights, TermMatch};
