pub mod evaluation;
pub mod rating_matrix;
pub mod recommender;
pub mod similarity;
pub mod strategies;

pub use evaluation::{EvaluationReport, EvaluationSettings, Evaluator};
pub use rating_matrix::RatingMatrix;
pub use recommender::{ItemModel, Recommender};
pub use similarity::SimilarityMatrix;
