//! Offline evaluation: hold out part of the log, fit on the rest and measure
//! how many recommended games show up among each user's held-out games.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;

use crate::{
    config::EvalConfig,
    error::{AppError, AppResult},
    models::{Interaction, ItemId, UserId},
};

use super::{
    recommender::ItemModel,
    strategies::{CollaborativeStrategy, PopularityStrategy, RandomStrategy, RecommendationStrategy},
};

/// Disjoint train/test partition of an interaction log
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSplit {
    pub train: Vec<Interaction>,
    pub test: Vec<Interaction>,
}

/// Shuffles with a seeded RNG and holds out `ceil(n * test_ratio)` interactions.
///
/// The same seed over the same input always gives the same split. Both halves
/// keep the input order.
pub fn train_test_split(interactions: &[Interaction], test_ratio: f64, seed: u64) -> EvaluationSplit {
    let n = interactions.len();
    let n_test = ((n as f64) * test_ratio).ceil().min(n as f64) as usize;

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut held_out = vec![false; n];
    for &idx in &order[..n_test] {
        held_out[idx] = true;
    }

    let (test, train): (Vec<_>, Vec<_>) = interactions
        .iter()
        .zip(held_out)
        .partition(|(_, is_test)| *is_test);

    EvaluationSplit {
        train: train.into_iter().map(|(i, _)| *i).collect(),
        test: test.into_iter().map(|(i, _)| *i).collect(),
    }
}

/// Draws up to `sample_size` distinct users. Asking for more users than exist
/// returns all of them, shuffled.
pub fn sample_users(users: &[UserId], sample_size: usize, seed: u64) -> Vec<UserId> {
    if sample_size > users.len() {
        tracing::warn!(
            requested = sample_size,
            available = users.len(),
            "Sample size exceeds user count, sampling every user"
        );
    }
    let mut rng = StdRng::seed_from_u64(seed);
    users
        .choose_multiple(&mut rng, sample_size.min(users.len()))
        .copied()
        .collect()
}

/// |recommended ∩ test_items| / k, or `None` when the user has no held-out games
pub fn precision_at_k(recommended: &[ItemId], test_items: &HashSet<ItemId>, k: usize) -> Option<f64> {
    if test_items.is_empty() || k == 0 {
        return None;
    }
    let recommended: HashSet<&ItemId> = recommended.iter().collect();
    let hits = recommended
        .into_iter()
        .filter(|item| test_items.contains(*item))
        .count();
    Some(hits as f64 / k as f64)
}

/// Knobs for one evaluation run
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub test_ratio: f64,
    pub split_seed: u64,
    pub sample_size: usize,
    pub sample_seed: u64,
    pub random_seed: Option<u64>,
    pub top_k: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            test_ratio: 0.1,
            split_seed: 42,
            sample_size: 300,
            sample_seed: 42,
            random_seed: None,
            top_k: 10,
        }
    }
}

impl From<&EvalConfig> for EvaluationSettings {
    fn from(config: &EvalConfig) -> Self {
        Self {
            test_ratio: config.test_ratio,
            split_seed: config.split_seed,
            sample_size: config.sample_size,
            sample_seed: config.sample_seed,
            random_seed: config.random_seed,
            top_k: config.top_k,
        }
    }
}

/// Outcome of scoring one strategy over the sampled users
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StrategyResult {
    pub strategy: String,
    /// Mean precision@k; `None` if no sampled user could be evaluated
    pub precision: Option<f64>,
    pub evaluated_users: usize,
    /// Sampled users with no held-out games
    pub not_evaluated_users: usize,
    /// Sampled users the strategy could not serve
    pub failed_users: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvaluationReport {
    pub train_size: usize,
    pub test_size: usize,
    pub top_k: usize,
    pub sample_size: usize,
    pub results: Vec<StrategyResult>,
}

impl EvaluationReport {
    pub fn result(&self, strategy: &str) -> Option<&StrategyResult> {
        self.results.iter().find(|r| r.strategy == strategy)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Train size: {}", self.train_size)?;
        writeln!(f, "Test size: {}", self.test_size)?;
        writeln!(
            f,
            "Precision@{} over {} sampled users",
            self.top_k, self.sample_size
        )?;
        for result in &self.results {
            let precision = result
                .precision
                .map(|p| format!("{:.4}", p))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                f,
                "  {:<14} {} (evaluated {}, not evaluated {}, failed {})",
                format!("{}:", result.strategy),
                precision,
                result.evaluated_users,
                result.not_evaluated_users,
                result.failed_users
            )?;
        }
        Ok(())
    }
}

/// Owns a split and the model fitted on its train half
pub struct Evaluator {
    settings: EvaluationSettings,
    split: EvaluationSplit,
    model: ItemModel,
    test_items: HashMap<UserId, HashSet<ItemId>>,
}

impl Evaluator {
    /// Splits the log and fits on the train half only
    pub fn new(interactions: &[Interaction], settings: EvaluationSettings) -> AppResult<Self> {
        if settings.top_k == 0 {
            return Err(AppError::InvalidInput("top_k must be at least 1".to_string()));
        }
        if !(settings.test_ratio > 0.0 && settings.test_ratio < 1.0) {
            return Err(AppError::InvalidInput(format!(
                "test_ratio must be in (0, 1), got {}",
                settings.test_ratio
            )));
        }

        let split = train_test_split(interactions, settings.test_ratio, settings.split_seed);
        tracing::info!(
            train_size = split.train.len(),
            test_size = split.test.len(),
            seed = settings.split_seed,
            "Interaction log split"
        );

        let model = ItemModel::fit(&split.train);

        let mut test_items: HashMap<UserId, HashSet<ItemId>> = HashMap::new();
        for interaction in &split.test {
            test_items
                .entry(interaction.user_id)
                .or_default()
                .insert(interaction.item_id);
        }

        Ok(Self {
            settings,
            split,
            model,
            test_items,
        })
    }

    pub fn split(&self) -> &EvaluationSplit {
        &self.split
    }

    pub fn model(&self) -> &ItemModel {
        &self.model
    }

    /// Re-seeded on every call, so every strategy is scored on the same users
    pub fn sample_users(&self) -> Vec<UserId> {
        sample_users(
            self.model.ratings().users(),
            self.settings.sample_size,
            self.settings.sample_seed,
        )
    }

    /// Scores one strategy. Users without held-out games and users the
    /// strategy fails on are counted and skipped; neither aborts the run.
    pub fn evaluate(&self, strategy: &mut dyn RecommendationStrategy) -> StrategyResult {
        let start = Instant::now();
        let k = self.settings.top_k;
        let empty = HashSet::new();

        let mut precisions = Vec::new();
        let mut not_evaluated_users = 0;
        let mut failed_users = 0;

        for user_id in self.sample_users() {
            let actual = self.test_items.get(&user_id).unwrap_or(&empty);
            if actual.is_empty() {
                tracing::debug!(user_id, strategy = strategy.name(), "Not evaluated: no test interactions");
                not_evaluated_users += 1;
                continue;
            }

            match strategy.recommend(user_id, k) {
                Ok(recommended) => {
                    if let Some(precision) = precision_at_k(&recommended, actual, k) {
                        precisions.push(precision);
                    }
                }
                Err(e) => {
                    tracing::warn!(user_id, strategy = strategy.name(), error = %e, "Recommendation failed");
                    failed_users += 1;
                }
            }
        }

        let precision = if precisions.is_empty() {
            None
        } else {
            Some(precisions.iter().sum::<f64>() / precisions.len() as f64)
        };

        tracing::info!(
            strategy = strategy.name(),
            precision = ?precision,
            evaluated = precisions.len(),
            not_evaluated = not_evaluated_users,
            failed = failed_users,
            elapsed_ms = start.elapsed().as_millis(),
            "Strategy evaluated"
        );

        StrategyResult {
            strategy: strategy.name().to_string(),
            precision,
            evaluated_users: precisions.len(),
            not_evaluated_users,
            failed_users,
        }
    }

    /// Collaborative filtering against the popularity and random baselines
    pub fn run(&self) -> EvaluationReport {
        let mut collaborative = CollaborativeStrategy::new(&self.model);
        let mut popularity = PopularityStrategy::from_interactions(&self.split.train);
        let mut random = RandomStrategy::new(
            self.model.ratings().items().to_vec(),
            self.settings.random_seed,
        );

        let strategies: [&mut dyn RecommendationStrategy; 3] =
            [&mut collaborative, &mut popularity, &mut random];
        let results = strategies
            .into_iter()
            .map(|strategy| self.evaluate(strategy))
            .collect();

        EvaluationReport {
            train_size: self.split.train.len(),
            test_size: self.split.test.len(),
            top_k: self.settings.top_k,
            sample_size: self.settings.sample_size.min(self.model.ratings().n_users()),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 60 users over 20 games. Users come in three taste groups; each user
    /// likes most of the games of their group and dislikes one outside it.
    fn synthetic_log() -> Vec<Interaction> {
        let mut log = Vec::new();
        for user in 0..60u64 {
            let group = user % 3;
            for item in 0..20u64 {
                if item % 3 == group && (item + user) % 4 != 0 {
                    log.push(Interaction::new(user, item, 1.0));
                }
            }
            log.push(Interaction::new(user, (group + 1 + user) % 20, 0.0));
        }
        log
    }

    fn settings() -> EvaluationSettings {
        EvaluationSettings {
            sample_size: 40,
            random_seed: Some(3),
            ..EvaluationSettings::default()
        }
    }

    #[test]
    fn test_split_is_reproducible() {
        let log = synthetic_log();
        assert_eq!(train_test_split(&log, 0.1, 42), train_test_split(&log, 0.1, 42));
        assert_ne!(train_test_split(&log, 0.1, 42), train_test_split(&log, 0.1, 43));
    }

    #[test]
    fn test_split_partitions_input() {
        let log = synthetic_log();
        let split = train_test_split(&log, 0.25, 1);
        assert_eq!(split.test.len(), (log.len() as f64 * 0.25).ceil() as usize);
        assert_eq!(split.train.len() + split.test.len(), log.len());

        let mut merged: Vec<(u64, u64)> = split
            .train
            .iter()
            .chain(&split.test)
            .map(|i| (i.user_id, i.item_id))
            .collect();
        let mut original: Vec<(u64, u64)> = log.iter().map(|i| (i.user_id, i.item_id)).collect();
        merged.sort();
        original.sort();
        assert_eq!(merged, original);
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let log = vec![
            Interaction::new(1, 1, 1.0),
            Interaction::new(1, 2, 1.0),
            Interaction::new(1, 3, 1.0),
        ];
        let split = train_test_split(&log, 0.1, 42);
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 2);
    }

    #[test]
    fn test_sample_users_without_replacement() {
        let users: Vec<UserId> = (0..100).collect();
        let sample = sample_users(&users, 30, 9);
        let unique: HashSet<UserId> = sample.iter().copied().collect();
        assert_eq!(sample.len(), 30);
        assert_eq!(unique.len(), 30);
        assert_eq!(sample, sample_users(&users, 30, 9));
    }

    #[test]
    fn test_sample_users_clamps_to_population() {
        let users: Vec<UserId> = vec![1, 2, 3];
        assert_eq!(sample_users(&users, 10, 0).len(), 3);
    }

    #[test]
    fn test_precision_at_k() {
        let test_items: HashSet<ItemId> = [1, 2, 3].into_iter().collect();
        assert_eq!(precision_at_k(&[1, 5, 3, 7], &test_items, 4), Some(0.5));
        // short lists are still divided by k
        assert_eq!(precision_at_k(&[1], &test_items, 10), Some(0.1));
        assert_eq!(precision_at_k(&[], &test_items, 10), Some(0.0));
    }

    #[test]
    fn test_precision_without_test_items_is_not_evaluated() {
        assert_eq!(precision_at_k(&[1, 2], &HashSet::new(), 2), None);
    }

    #[test]
    fn test_random_precision_matches_expected_rate() {
        // 50 games, 10 held out, 10 drawn: expected precision 10 / 50
        let items: Vec<ItemId> = (0..50).collect();
        let test_items: HashSet<ItemId> = (0..10).collect();
        let mut strategy = RandomStrategy::new(items, Some(2024));

        let draws = 2000;
        let total: f64 = (0..draws)
            .map(|_| {
                let recs = strategy.recommend(0, 10).unwrap();
                precision_at_k(&recs, &test_items, 10).unwrap()
            })
            .sum();
        let mean = total / draws as f64;
        assert!((mean - 0.2).abs() < 0.02, "mean precision {}", mean);
    }

    #[test]
    fn test_evaluator_fits_on_train_only() {
        let log = synthetic_log();
        let evaluator = Evaluator::new(&log, settings()).unwrap();
        let train_users: HashSet<UserId> =
            evaluator.split().train.iter().map(|i| i.user_id).collect();
        assert_eq!(evaluator.model().ratings().n_users(), train_users.len());
        assert!(evaluator
            .sample_users()
            .iter()
            .all(|user| train_users.contains(user)));
    }

    #[test]
    fn test_users_without_test_items_are_skipped() {
        let log = synthetic_log();
        let evaluator = Evaluator::new(&log, settings()).unwrap();
        let mut popularity = PopularityStrategy::from_interactions(&evaluator.split().train);
        let result = evaluator.evaluate(&mut popularity);

        let sampled = evaluator.sample_users();
        let with_test = sampled
            .iter()
            .filter(|user| evaluator.test_items.contains_key(*user))
            .count();
        assert_eq!(result.evaluated_users, with_test);
        assert_eq!(result.not_evaluated_users, sampled.len() - with_test);
        assert_eq!(result.failed_users, 0);
    }

    #[test]
    fn test_failing_strategy_does_not_abort() {
        struct Failing;
        impl RecommendationStrategy for Failing {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn recommend(&mut self, user_id: UserId, _top_k: usize) -> AppResult<Vec<ItemId>> {
                Err(AppError::UnknownUser(user_id))
            }
        }

        let evaluator = Evaluator::new(&synthetic_log(), settings()).unwrap();
        let result = evaluator.evaluate(&mut Failing);
        assert_eq!(result.precision, None);
        assert_eq!(result.evaluated_users, 0);
        assert!(result.failed_users > 0);
    }

    #[test]
    fn test_run_is_reproducible_for_seeded_strategies() {
        let log = synthetic_log();
        let first = Evaluator::new(&log, settings()).unwrap().run();
        let second = Evaluator::new(&log, settings()).unwrap().run();

        assert_eq!(first.results.len(), 3);
        for name in ["collaborative", "popularity"] {
            assert_eq!(first.result(name), second.result(name));
        }
        for result in &first.results {
            let precision = result.precision.expect("some sampled users have test items");
            assert!((0.0..=1.0).contains(&precision));
        }
    }

    #[test]
    fn test_collaborative_beats_random_on_grouped_tastes() {
        let report = Evaluator::new(&synthetic_log(), settings()).unwrap().run();
        let collaborative = report.result("collaborative").unwrap().precision.unwrap();
        let random = report.result("random").unwrap().precision.unwrap();
        assert!(collaborative > random);
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let settings = EvaluationSettings {
            top_k: 0,
            ..EvaluationSettings::default()
        };
        assert!(Evaluator::new(&synthetic_log(), settings).is_err());
    }

    #[test]
    fn test_report_display_labels_strategies() {
        let report = Evaluator::new(&synthetic_log(), settings()).unwrap().run();
        let text = report.to_string();
        assert!(text.contains("Precision@10 over 40 sampled users"));
        assert!(text.contains("collaborative:"));
        assert!(text.contains("popularity:"));
        assert!(text.contains("random:"));
    }
}
