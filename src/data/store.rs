use std::io::Read;
use std::path::Path;

use crate::{
    error::AppResult,
    models::{Interaction, ItemCatalog, ReviewRecord},
};

/// The cleaned review log held in memory: rating events plus display names.
///
/// Immutable once loaded. Evaluation splits copy out of it rather than
/// editing it in place.
#[derive(Debug, Clone, Default)]
pub struct InteractionStore {
    interactions: Vec<Interaction>,
    catalog: ItemCatalog,
}

impl InteractionStore {
    pub fn from_records(records: &[ReviewRecord]) -> Self {
        Self {
            interactions: records.iter().map(Interaction::from).collect(),
            catalog: ItemCatalog::from_records(records),
        }
    }

    /// Reads a trimmed review table from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let records = read_records(reader)?;
        Ok(Self::from_records(&records))
    }

    /// Reads a trimmed review table from disk
    pub fn load_csv(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading interaction log");

        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file)?;

        tracing::info!(
            interactions = store.interactions.len(),
            games = store.catalog.len(),
            "Interaction log loaded"
        );
        Ok(store)
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }
}

/// Deserializes every row of a review table
pub fn read_records<R: Read>(reader: R) -> AppResult<Vec<ReviewRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
