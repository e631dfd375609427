//! Resolving scanned parameters into an item

use crate::config::schema::CatalogItem;
use crate::ledger::Item;
use tracing::debug;

/// Name used when a scan carries no name
pub const DEFAULT_NAME: &str = "Unknown Duck";

/// Fact used when a scan carries no fact
pub const DEFAULT_FACT: &str = "No fact available.";

/// Parameters carried by a scan; empty strings count as absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub fact: Option<String>,
    pub image: Option<String>,
}

impl ScanParams {
    fn id(&self) -> Option<&str> {
        present(&self.id)
    }

    fn name(&self) -> Option<&str> {
        present(&self.name)
    }

    fn fact(&self) -> Option<&str> {
        present(&self.fact)
    }

    fn image(&self) -> Option<&str> {
        present(&self.image)
    }

    fn has_details(&self) -> bool {
        self.name().is_some() || self.fact().is_some() || self.image().is_some()
    }
}

/// Known items, looked up by id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Item> {
        self.items.iter().find(|c| c.id == id).map(|c| Item {
            id: Some(c.id.clone()),
            name: c.name.clone(),
            fact: c.fact.clone(),
            image: c.image.clone().filter(|i| !i.is_empty()),
        })
    }

    /// Resolve a scan into an item, or `None` when it names nothing
    ///
    /// Any of name, fact, or image builds the item from the scan itself with
    /// defaults for the missing text. A bare id is looked up here.
    pub fn resolve(&self, params: &ScanParams) -> Option<Item> {
        if params.has_details() {
            let item = Item {
                id: params.id().map(str::to_string),
                name: params.name().unwrap_or(DEFAULT_NAME).to_string(),
                fact: params.fact().unwrap_or(DEFAULT_FACT).to_string(),
                image: params.image().map(str::to_string),
            };
            debug!("Item built from scan: {:?}", item);
            return Some(item);
        }

        let id = params.id()?;
        let item = self.get(id);
        debug!("Catalog lookup for {}: {}", id, if item.is_some() { "hit" } else { "miss" });
        item
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
