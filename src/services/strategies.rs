use std::collections::HashMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    error::AppResult,
    models::{Interaction, ItemId, UserId},
};

use super::recommender::ItemModel;

/// Something that can produce a top-k item list for a user during evaluation
pub trait RecommendationStrategy {
    /// Label used in logs and the evaluation report
    fn name(&self) -> &'static str;

    fn recommend(&mut self, user_id: UserId, top_k: usize) -> AppResult<Vec<ItemId>>;
}

/// Item-item collaborative filtering over a fitted model
pub struct CollaborativeStrategy<'a> {
    model: &'a ItemModel,
}

impl<'a> CollaborativeStrategy<'a> {
    pub fn new(model: &'a ItemModel) -> Self {
        Self { model }
    }
}

impl RecommendationStrategy for CollaborativeStrategy<'_> {
    fn name(&self) -> &'static str {
        "collaborative"
    }

    fn recommend(&mut self, user_id: UserId, top_k: usize) -> AppResult<Vec<ItemId>> {
        let ranked = self.model.items_for_user(user_id, top_k)?;
        Ok(ranked.into_iter().map(|(item_id, _)| item_id).collect())
    }
}

/// The same globally most-liked games for every user
#[derive(Debug, Clone)]
pub struct PopularityStrategy {
    ranking: Vec<ItemId>,
}

impl PopularityStrategy {
    /// Ranks games by their number of positive ratings, most first.
    /// Equal counts are ordered by ascending id; games never liked are left out.
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        let mut counts: HashMap<ItemId, usize> = HashMap::new();
        for interaction in interactions.iter().filter(|i| i.rating > 0.0) {
            *counts.entry(interaction.item_id).or_insert(0) += 1;
        }

        let mut ranked: Vec<(ItemId, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            ranking: ranked.into_iter().map(|(item_id, _)| item_id).collect(),
        }
    }

    pub fn ranking(&self) -> &[ItemId] {
        &self.ranking
    }
}

impl RecommendationStrategy for PopularityStrategy {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn recommend(&mut self, _user_id: UserId, top_k: usize) -> AppResult<Vec<ItemId>> {
        Ok(self.ranking.iter().take(top_k).copied().collect())
    }
}

/// Uniformly drawn distinct games, fresh on every call
pub struct RandomStrategy {
    items: Vec<ItemId>,
    rng: StdRng,
}

impl RandomStrategy {
    /// Draws are reproducible only when `seed` is given
    pub fn new(items: Vec<ItemId>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { items, rng }
    }
}

impl RecommendationStrategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn recommend(&mut self, _user_id: UserId, top_k: usize) -> AppResult<Vec<ItemId>> {
        if self.items.len() <= top_k {
            return Ok(self.items.clone());
        }
        Ok(self
            .items
            .choose_multiple(&mut self.rng, top_k)
            .copied()
            .collect())
    }
}
