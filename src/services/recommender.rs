use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::{Interaction, ItemCatalog, ItemId, Recommendation, UserId},
};

use super::{rating_matrix::RatingMatrix, similarity::SimilarityMatrix};

/// A rating matrix together with the similarity matrix derived from it.
///
/// The pair is only ever built together and is read-only afterwards. Picking
/// up new data means fitting a fresh model and swapping the whole value.
#[derive(Debug, Clone)]
pub struct ItemModel {
    ratings: RatingMatrix,
    similarity: SimilarityMatrix,
}

impl ItemModel {
    pub fn fit(interactions: &[Interaction]) -> Self {
        let ratings = RatingMatrix::from_interactions(interactions);
        let similarity = SimilarityMatrix::from_ratings(&ratings);

        tracing::info!(
            users = ratings.n_users(),
            items = ratings.n_items(),
            "Item model fitted"
        );

        Self {
            ratings,
            similarity,
        }
    }

    pub fn ratings(&self) -> &RatingMatrix {
        &self.ratings
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Games similar to `item_id`, best first, never including `item_id` itself.
    ///
    /// An id outside the similarity index yields an empty list, not an error.
    pub fn similar_items(&self, item_id: ItemId, top_k: usize) -> Vec<(ItemId, f64)> {
        let Some(pos) = self.similarity.position(item_id) else {
            tracing::debug!(item_id, "Unknown item, no similar items");
            return Vec::new();
        };

        let candidates = self
            .similarity
            .items()
            .iter()
            .copied()
            .zip(self.similarity.row(pos).iter().copied())
            .filter(|&(other, _)| other != item_id);

        rank(candidates, top_k)
    }

    /// Games predicted relevant to `user_id`, best first.
    ///
    /// Each candidate scores the sum of its similarities to the games the user
    /// rated above zero; those liked games are never returned. A user with no
    /// liked games scores everything 0.0 and gets the first `top_k` games in
    /// index order.
    pub fn items_for_user(&self, user_id: UserId, top_k: usize) -> AppResult<Vec<(ItemId, f64)>> {
        let row = self
            .ratings
            .user_position(user_id)
            .ok_or(AppError::UnknownUser(user_id))?;

        let liked: Vec<usize> = self
            .ratings
            .user_row(row)
            .iter()
            .enumerate()
            .filter(|&(_, &rating)| rating > 0.0)
            .map(|(col, _)| col)
            .collect();

        let mut scores = vec![0.0; self.similarity.len()];
        for &col in &liked {
            // rating and similarity indices share the same sorted item order
            for (score, sim) in scores.iter_mut().zip(self.similarity.row(col)) {
                *score += sim;
            }
        }

        let candidates = self
            .similarity
            .items()
            .iter()
            .copied()
            .zip(scores)
            .enumerate()
            .filter(|(pos, _)| liked.binary_search(pos).is_err())
            .map(|(_, candidate)| candidate);

        Ok(rank(candidates, top_k))
    }
}

/// Stable sort by descending score; equal scores keep index (ascending id) order
fn rank(candidates: impl Iterator<Item = (ItemId, f64)>, top_k: usize) -> Vec<(ItemId, f64)> {
    let mut ranked: Vec<(ItemId, f64)> = candidates.collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(top_k);
    ranked
}

/// Serves named recommendations from a fitted model
pub struct Recommender<'a> {
    model: &'a ItemModel,
    catalog: &'a ItemCatalog,
}

impl<'a> Recommender<'a> {
    pub fn new(model: &'a ItemModel, catalog: &'a ItemCatalog) -> Self {
        Self { model, catalog }
    }

    /// Top `top_k` games most similar to `item_id`; empty for an unknown id
    pub fn recommend_similar_items(&self, item_id: ItemId, top_k: usize) -> Vec<Recommendation> {
        self.decorate(self.model.similar_items(item_id, top_k))
    }

    /// Top `top_k` games for `user_id`, excluding games the user already likes
    pub fn recommend_for_user(
        &self,
        user_id: UserId,
        top_k: usize,
    ) -> AppResult<Vec<Recommendation>> {
        Ok(self.decorate(self.model.items_for_user(user_id, top_k)?))
    }

    fn decorate(&self, ranked: Vec<(ItemId, f64)>) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .map(|(app_id, score)| Recommendation {
                app_id,
                app_name: self.catalog.display_name(app_id),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // users 1..=4 over games 10, 20, 30, 40
    fn interactions() -> Vec<Interaction> {
        vec![
            Interaction::new(1, 10, 1.0),
            Interaction::new(1, 20, 1.0),
            Interaction::new(2, 10, 1.0),
            Interaction::new(2, 20, 1.0),
            Interaction::new(2, 30, 1.0),
            Interaction::new(3, 30, 1.0),
            Interaction::new(3, 40, 1.0),
            Interaction::new(4, 40, 0.0),
        ]
    }

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        catalog.insert(10, "Counter-Strike");
        catalog.insert(20, "Half-Life");
        catalog.insert(30, "Portal");
        catalog
    }

    #[test]
    fn test_similar_items_excludes_query_and_is_sorted() {
        let model = ItemModel::fit(&interactions());
        for &item in model.similarity().items() {
            let recs = model.similar_items(item, 10);
            assert_eq!(recs.len(), 3);
            assert!(recs.iter().all(|&(id, _)| id != item));
            assert!(recs.windows(2).all(|w| w[0].1 >= w[1].1));
        }
    }

    #[test]
    fn test_similar_items_best_match_first() {
        let model = ItemModel::fit(&interactions());
        let recs = model.similar_items(10, 1);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].0, 20);
    }

    #[test]
    fn test_similar_items_ties_in_id_order() {
        // 20 and 30 are both orthogonal to 10
        let model = ItemModel::fit(&[
            Interaction::new(1, 10, 1.0),
            Interaction::new(2, 30, 1.0),
            Interaction::new(3, 20, 1.0),
        ]);
        let ids: Vec<ItemId> = model.similar_items(10, 5).iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![20, 30]);
    }

    #[test]
    fn test_unknown_item_is_empty() {
        let model = ItemModel::fit(&interactions());
        assert!(model.similar_items(999, 10).is_empty());
    }

    #[test]
    fn test_top_k_zero_is_empty() {
        let model = ItemModel::fit(&interactions());
        assert!(model.similar_items(10, 0).is_empty());
    }

    #[test]
    fn test_user_recommendations_exclude_liked() {
        let model = ItemModel::fit(&interactions());
        let recs = model.items_for_user(1, 10).unwrap();
        let ids: Vec<ItemId> = recs.iter().map(|r| r.0).collect();
        assert!(!ids.contains(&10));
        assert!(!ids.contains(&20));
        // 30 shares user 2 with both liked games, 40 shares nobody with them
        assert_eq!(ids, vec![30, 40]);
    }

    #[test]
    fn test_user_scores_are_summed_similarities() {
        let model = ItemModel::fit(&interactions());
        let recs = model.items_for_user(1, 1).unwrap();
        let sims = model.similarity();
        let expected = sims.get(10, 30).unwrap() + sims.get(20, 30).unwrap();
        assert!((recs[0].1 - expected).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_user_is_an_error() {
        let model = ItemModel::fit(&interactions());
        let result = model.items_for_user(999, 10);
        assert!(matches!(result, Err(AppError::UnknownUser(999))));
    }

    #[test]
    fn test_user_without_likes_gets_index_order_slice() {
        // user 4 only rated game 40 with a 0
        let model = ItemModel::fit(&interactions());
        let recs = model.items_for_user(4, 3).unwrap();
        assert_eq!(recs, vec![(10, 0.0), (20, 0.0), (30, 0.0)]);
    }

    #[test]
    fn test_recommender_decorates_with_names() {
        let model = ItemModel::fit(&interactions());
        let catalog = catalog();
        let recommender = Recommender::new(&model, &catalog);

        let recs = recommender.recommend_similar_items(10, 1);
        assert_eq!(recs[0].app_name, "Half-Life");

        // game 40 has no catalog entry, so its id stands in for the name
        let recs = recommender.recommend_for_user(1, 2).unwrap();
        assert_eq!(recs[1].app_id, 40);
        assert_eq!(recs[1].app_name, "40");
    }

    #[test]
    fn test_recommender_unknown_user() {
        let model = ItemModel::fit(&interactions());
        let catalog = catalog();
        let recommender = Recommender::new(&model, &catalog);
        assert!(recommender.recommend_for_user(42, 5).is_err());
    }
}
