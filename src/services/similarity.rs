use std::collections::HashMap;

use crate::models::ItemId;

use super::rating_matrix::RatingMatrix;

/// Symmetric item × item cosine similarity over the columns of a [`RatingMatrix`].
///
/// # Scaling
///
/// Building costs O(items² × users) time and O(items²) memory. That is fine for
/// a trimmed catalog of a few thousand games and does not hold up for an
/// open-ended catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    items: Vec<ItemId>,
    item_index: HashMap<ItemId, usize>,
    /// Row-major, `items.len()²`
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// sim(i, j) = dot(v_i, v_j) / (‖v_i‖ · ‖v_j‖), 0 when either norm is zero.
    ///
    /// Only the upper triangle is computed; the lower one is a mirror copy, so
    /// sim(i, j) and sim(j, i) are the same bits. The diagonal is set to 1.0
    /// outright, including items whose vector is all zeros.
    pub fn from_ratings(ratings: &RatingMatrix) -> Self {
        let items = ratings.items().to_vec();
        let n = items.len();

        let vectors: Vec<Vec<f64>> = (0..n).map(|col| ratings.item_column(col)).collect();
        let norms: Vec<f64> = vectors.iter().map(|v| dot(v, v).sqrt()).collect();

        let mut values = vec![0.0; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let sim = cosine(&vectors[i], norms[i], &vectors[j], norms[j]);
                values[i * n + j] = sim;
                values[j * n + i] = sim;
            }
        }

        tracing::debug!(items = n, users = ratings.n_users(), "Similarity matrix built");

        Self {
            item_index: items.iter().enumerate().map(|(pos, &id)| (id, pos)).collect(),
            items,
            values,
        }
    }

    /// Item ids in row/column order (ascending)
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn position(&self, item_id: ItemId) -> Option<usize> {
        self.item_index.get(&item_id).copied()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.item_index.contains_key(&item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, a: ItemId, b: ItemId) -> Option<f64> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(self.values[i * self.items.len() + j])
    }

    /// Similarities of one item to every item, in index order
    pub fn row(&self, pos: usize) -> &[f64] {
        let n = self.items.len();
        &self.values[pos * n..(pos + 1) * n]
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine(a: &[f64], norm_a: f64, b: &[f64], norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
