pub mod eval;
pub mod search;

pub use eval::{Evaluation, HeuristicEvaluator};
pub use search::{SearchReport, Searcher};
