//! Collection Fixtures

use serde::Deserialize;

use crate::{
    collections::{Collection, CollectionRule, MatchMode, sorting::SortOrder},
    fixtures::FixtureError,
    ids::CollectionId,
};

/// Wrapper for collections in YAML
#[derive(Debug, Deserialize)]
pub struct CollectionsFixture {
    /// Collections
    pub collections: Vec<CollectionFixture>,
}

/// Collection Fixture
#[derive(Debug, Deserialize)]
pub struct CollectionFixture {
    /// Collection id
    pub id: CollectionId,

    /// URL handle
    pub handle: String,

    /// Title
    pub title: String,

    /// Description
    #[serde(default)]
    pub body: String,

    /// Published flag
    #[serde(default)]
    pub published: bool,

    /// Combination mode (`all` or `any`)
    #[serde(rename = "match", default)]
    pub mode: MatchMode,

    /// Presentational order
    #[serde(default)]
    pub sort_order: SortOrder,

    /// Up to three `[subject code, operator code, operand]` triples
    #[serde(default)]
    pub conditions: Vec<(u8, u8, String)>,
}

impl TryFrom<CollectionFixture> for Collection {
    type Error = FixtureError;

    fn try_from(fixture: CollectionFixture) -> Result<Self, Self::Error> {
        let rule = CollectionRule::from_codes(fixture.mode, fixture.conditions)?;

        let mut collection = Collection::new(fixture.id, fixture.handle, fixture.title, rule)
            .with_sort_order(fixture.sort_order)
            .with_published(fixture.published);

        collection.body = fixture.body;

        Ok(collection)
    }
}
