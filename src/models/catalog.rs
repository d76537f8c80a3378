use std::collections::HashMap;

use super::{Game, ItemId, ReviewRecord};

/// Display names for games. Decorates output only; never consulted for ranking.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    names: HashMap<ItemId, String>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a name; the first name seen for an app_id is kept
    pub fn insert(&mut self, app_id: ItemId, app_name: impl Into<String>) {
        self.names.entry(app_id).or_insert_with(|| app_name.into());
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ReviewRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record.app_id, record.app_name.as_str());
        }
        catalog
    }

    pub fn contains(&self, app_id: ItemId) -> bool {
        self.names.contains_key(&app_id)
    }

    pub fn name(&self, app_id: ItemId) -> Option<&str> {
        self.names.get(&app_id).map(String::as_str)
    }

    /// Name for display, falling back to the id itself
    pub fn display_name(&self, app_id: ItemId) -> String {
        self.name(app_id)
            .map(str::to_string)
            .unwrap_or_else(|| app_id.to_string())
    }

    pub fn game(&self, app_id: ItemId) -> Option<Game> {
        self.name(app_id).map(|name| Game {
            app_id,
            app_name: name.to_string(),
        })
    }

    /// All games ordered by name, ties by app_id
    pub fn sorted_by_name(&self) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .names
            .iter()
            .map(|(&app_id, name)| Game {
                app_id,
                app_name: name.clone(),
            })
            .collect();
        games.sort_by(|a, b| {
            a.app_name
                .cmp(&b.app_name)
                .then_with(|| a.app_id.cmp(&b.app_id))
        });
        games
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
