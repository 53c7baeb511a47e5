use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An optional extra service the customer selected (packing, assembly, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalService {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl AdditionalService {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            quantity: None,
        }
    }
}

/// A purchasable moving supply as listed in the supply catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyItem {
    pub id: String,
    pub category: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// A supply line in the form document.
///
/// `price` is copied from the catalog when the item is first selected and is
/// never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplySelection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl SupplySelection {
    pub fn snapshot(
        item: &SupplyItem,
        quantity: u32,
    ) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            quantity,
        }
    }
}

/// The supply items customers can pick from, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyCatalog {
    items: Vec<SupplyItem>,
}

impl SupplyCatalog {
    pub fn new(items: Vec<SupplyItem>) -> Self {
        Self { items }
    }

    pub fn get(
        &self,
        id: &str,
    ) -> Option<&SupplyItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[SupplyItem] {
        &self.items
    }

    /// Category names in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for item in &self.items {
            if !categories.contains(&item.category.as_str()) {
                categories.push(&item.category);
            }
        }
        categories
    }

    pub fn in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a SupplyItem> + 'a {
        self.items.iter().filter(move |item| item.category == category)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn item(
        id: &str,
        category: &str,
    ) -> SupplyItem {
        SupplyItem {
            id: id.to_string(),
            category: category.to_string(),
            name: id.to_string(),
            description: String::new(),
            price: dec!(2.50),
        }
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let catalog = SupplyCatalog::new(vec![
            item("small-box", "boxes"),
            item("tape", "packing"),
            item("large-box", "boxes"),
        ]);

        assert_eq!(catalog.categories(), vec!["boxes", "packing"]);
        assert_eq!(catalog.in_category("boxes").count(), 2);
    }

    #[test]
    fn snapshot_copies_price() {
        let selection = SupplySelection::snapshot(&item("tape", "packing"), 3);

        assert_eq!(selection.price, dec!(2.50));
        assert_eq!(selection.quantity, 3);
    }
}
