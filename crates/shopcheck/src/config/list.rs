//! List template configuration.

use super::TemplateConfig;
use crate::result::{TemplateError, TemplateResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// List/grid template configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTemplateConfig {
    /// Shared template settings
    #[serde(flatten)]
    pub base: TemplateConfig,
    /// Element wrapping all items
    pub container_selector: String,
    /// Item selector, relative to the container
    pub item_selector: String,
    /// Field name to selector relative to an item
    #[serde(default)]
    pub item_fields: BTreeMap<String, String>,
    /// "Load more" control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_more_button: Option<String>,
    /// Pagination control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_selector: Option<String>,
    /// Search input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_selector: Option<String>,
    /// Filter control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_selector: Option<String>,
    /// Sort `<select>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_selector: Option<String>,
    /// Shown when the list has no items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_state_selector: Option<String>,
}

impl ListTemplateConfig {
    /// List with no item fields or optional features
    #[must_use]
    pub fn new(
        base: TemplateConfig,
        container_selector: impl Into<String>,
        item_selector: impl Into<String>,
    ) -> Self {
        Self {
            base,
            container_selector: container_selector.into(),
            item_selector: item_selector.into(),
            item_fields: BTreeMap::new(),
            load_more_button: None,
            pagination_selector: None,
            search_selector: None,
            filter_selector: None,
            sort_selector: None,
            empty_state_selector: None,
        }
    }

    /// Add an item field
    #[must_use]
    pub fn with_item_field(mut self, name: impl Into<String>, selector: impl Into<String>) -> Self {
        let _ = self.item_fields.insert(name.into(), selector.into());
        self
    }

    /// Set the search input
    #[must_use]
    pub fn with_search(mut self, selector: impl Into<String>) -> Self {
        self.search_selector = Some(selector.into());
        self
    }

    /// Set the sort select
    #[must_use]
    pub fn with_sort(mut self, selector: impl Into<String>) -> Self {
        self.sort_selector = Some(selector.into());
        self
    }

    /// Set the load-more control
    #[must_use]
    pub fn with_load_more(mut self, selector: impl Into<String>) -> Self {
        self.load_more_button = Some(selector.into());
        self
    }

    /// Set the empty-state element
    #[must_use]
    pub fn with_empty_state(mut self, selector: impl Into<String>) -> Self {
        self.empty_state_selector = Some(selector.into());
        self
    }

    /// Validate shared settings and required selectors
    pub fn validate(&self) -> TemplateResult<()> {
        self.base.validate()?;
        let name = &self.base.template_name;
        if self.container_selector.trim().is_empty() || self.item_selector.trim().is_empty() {
            return Err(TemplateError::configuration(format!(
                "list '{name}' needs both container_selector and item_selector"
            )));
        }
        if let Some((field, _)) = self.item_fields.iter().find(|(_, s)| s.trim().is_empty()) {
            return Err(TemplateError::configuration(format!(
                "item field '{field}' in list '{name}' has an empty selector"
            )));
        }
        Ok(())
    }
}

/// Product grid
#[must_use]
pub fn products_list_template() -> ListTemplateConfig {
    let base = TemplateConfig::new("products-list")
        .with_selector("container", ".features_items, .products-list, .product-grid")
        .with_selector("loadMoreButton", ".load-more, .pagination .next")
        .with_selector("searchInput", "#search_product, .search-box input")
        .with_selector("sortSelect", ".sort-dropdown, select[name=\"sort\"]");

    ListTemplateConfig::new(
        base,
        ".features_items, .products-list",
        ".productinfo, .product-item, .col-sm-4",
    )
    .with_item_field("name", "p, .product-name, h2")
    .with_item_field("price", ".price, .product-price")
    .with_item_field("image", "img")
    .with_item_field("addToCartButton", ".add-to-cart, .btn-cart")
    .with_item_field("viewProductButton", ".view-product, .btn-view")
    .with_search("#search_product, .search-box input")
    .with_sort(".sort-dropdown, select[name=\"sort\"]")
    .with_load_more(".load-more, .pagination .next")
    .with_empty_state(".no-products, .empty-state")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_builtin() {
        let config = products_list_template();
        config.validate().unwrap();
        assert_eq!(config.item_fields.len(), 5);
        assert!(config.search_selector.is_some());
        assert!(config.filter_selector.is_none());
    }

    #[test]
    fn test_missing_item_selector_rejected() {
        let config = ListTemplateConfig::new(TemplateConfig::new("rows"), "table", " ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_optional_features() {
        let yaml = r"
template_name: brands
container_selector: .brands_products
item_selector: li
item_fields:
  name: a
";
        let config: ListTemplateConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(config.search_selector.is_none());
        assert_eq!(config.item_fields.get("name").map(String::as_str), Some("a"));
        config.validate().unwrap();
    }
}
