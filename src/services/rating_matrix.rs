use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{Interaction, ItemId, UserId};

/// Dense user × item table of aggregated ratings.
///
/// Rows and columns are the distinct user and item ids, sorted ascending, so two
/// matrices built from the same interactions are bit-for-bit equal. A missing
/// (user, item) pair is stored as 0.0, meaning "no signal". An explicit 0.0
/// rating is indistinguishable from that.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    user_index: HashMap<UserId, usize>,
    item_index: HashMap<ItemId, usize>,
    /// Row-major, `users.len() * items.len()`
    cells: Vec<f64>,
}

impl RatingMatrix {
    /// Pivots interactions into the matrix. Duplicate pairs are averaged.
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        let users: Vec<UserId> = interactions
            .iter()
            .map(|i| i.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let items: Vec<ItemId> = interactions
            .iter()
            .map(|i| i.item_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_index = index_of(&users);
        let item_index = index_of(&items);

        // (sum, count) per pair
        let mut sums: BTreeMap<(usize, usize), (f64, u32)> = BTreeMap::new();
        for interaction in interactions {
            let row = user_index[&interaction.user_id];
            let col = item_index[&interaction.item_id];
            let entry = sums.entry((row, col)).or_insert((0.0, 0));
            entry.0 += interaction.rating;
            entry.1 += 1;
        }

        let mut cells = vec![0.0; users.len() * items.len()];
        for ((row, col), (sum, count)) in sums {
            cells[row * items.len() + col] = sum / count as f64;
        }

        tracing::debug!(
            users = users.len(),
            items = items.len(),
            observed = interactions.len(),
            "Rating matrix built"
        );

        Self {
            users,
            items,
            user_index,
            item_index,
            cells,
        }
    }

    /// Row ids, ascending
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Column ids, ascending
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn user_position(&self, user_id: UserId) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    pub fn item_position(&self, item_id: ItemId) -> Option<usize> {
        self.item_index.get(&item_id).copied()
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    /// Rating for a pair; `None` only when either id is outside the index
    pub fn get(&self, user_id: UserId, item_id: ItemId) -> Option<f64> {
        let row = self.user_position(user_id)?;
        let col = self.item_position(item_id)?;
        Some(self.cells[row * self.items.len() + col])
    }

    /// One user's ratings in column order
    pub fn user_row(&self, row: usize) -> &[f64] {
        let width = self.items.len();
        &self.cells[row * width..(row + 1) * width]
    }

    /// One item's ratings in row order (its vector for similarity)
    pub fn item_column(&self, col: usize) -> Vec<f64> {
        (0..self.users.len())
            .map(|row| self.cells[row * self.items.len() + col])
            .collect()
    }
}

fn index_of<T: Copy + Eq + std::hash::Hash>(ids: &[T]) -> HashMap<T, usize> {
    ids.iter().enumerate().map(|(pos, &id)| (id, pos)).collect()
}
