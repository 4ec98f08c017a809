mod priority_score;

pub use priority_score::*;
