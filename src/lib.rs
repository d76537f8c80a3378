//! Item-to-item game recommendations from binary Steam reviews.
//!
//! A trimmed review log is pivoted into a user × game [`RatingMatrix`], game
//! vectors are compared by cosine similarity and the resulting
//! [`SimilarityMatrix`] drives both "games like this one" and per-user
//! recommendations. [`services::evaluation`] measures precision@k of that
//! approach against popularity and random baselines.
//!
//! [`RatingMatrix`]: services::RatingMatrix
//! [`SimilarityMatrix`]: services::SimilarityMatrix

pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;

pub use error::{AppError, AppResult};
