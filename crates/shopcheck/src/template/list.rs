//! List template: item lookup, search, sort and incremental loading.

use super::{BaseTemplate, Template, TemplateContext};
use crate::assertion::Assertion;
use crate::config::{ListTemplateConfig, TemplateKind};
use crate::locator::Locator;
use crate::result::{TemplateError, TemplateResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of [`ListTemplate::load_more_items`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// Control not visible; nothing left to load
    Exhausted,
    /// Control clicked
    Loaded {
        /// Items before the click
        before: usize,
        /// Items after the settle wait
        after: usize,
    },
}

/// List/grid template
#[derive(Debug)]
pub struct ListTemplate {
    base: BaseTemplate,
    config: Arc<ListTemplateConfig>,
    container: Locator,
    item: Locator,
}

impl ListTemplate {
    /// Bind a list config to a page
    #[must_use]
    pub fn new(ctx: TemplateContext, config: Arc<ListTemplateConfig>) -> Self {
        let container = Locator::new(config.container_selector.as_str());
        let item = container.locator(config.item_selector.as_str());
        Self {
            base: BaseTemplate::new(ctx, config.base.clone()),
            config,
            container,
            item,
        }
    }

    /// List config
    #[must_use]
    pub fn config(&self) -> &ListTemplateConfig {
        &self.config
    }

    /// Container locator
    #[must_use]
    pub const fn container(&self) -> &Locator {
        &self.container
    }

    fn feature(&self, selector: Option<&str>, feature: &'static str) -> TemplateResult<Locator> {
        selector
            .map(Locator::new)
            .ok_or_else(|| TemplateError::FeatureNotConfigured {
                feature,
                template: self.base.template_name().to_string(),
            })
    }

    fn field_selector(&self, field: &str) -> TemplateResult<&str> {
        self.config
            .item_fields
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::FieldNotConfigured {
                field: field.to_string(),
                template: self.base.template_name().to_string(),
            })
    }

    /// Current items, one indexed locator each.
    ///
    /// Waits for the container first. The snapshot is not live: call again
    /// after the page changes.
    pub async fn items(&self) -> TemplateResult<Vec<Locator>> {
        self.base.wait_for_element(&self.container).await?;
        let count = self.base.page().count(&self.item).await?;
        debug!(template = %self.base.template_name(), count, "found items");
        Ok((0..count).map(|i| self.item.nth(i)).collect())
    }

    /// Number of current items
    pub async fn item_count(&self) -> TemplateResult<usize> {
        Ok(self.items().await?.len())
    }

    /// Item at `index`
    pub async fn item_by_index(&self, index: usize) -> TemplateResult<Locator> {
        let mut items = self.items().await?;
        let count = items.len();
        if index >= count {
            return Err(TemplateError::IndexOutOfRange { index, count });
        }
        Ok(items.swap_remove(index))
    }

    /// First item whose `field` text equals `value`, both sides trimmed
    pub async fn find_item_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> TemplateResult<Option<Locator>> {
        let selector = self.field_selector(field)?;
        let wanted = value.trim();
        let page = self.base.page();

        for item in self.items().await? {
            let field_locator = item.locator(selector);
            if page.count(&field_locator).await? == 0 {
                continue;
            }
            let text = page.text_content(&field_locator).await?;
            if text.as_deref().map(str::trim) == Some(wanted) {
                debug!(field, value, "found item");
                return Ok(Some(item));
            }
        }

        debug!(field, value, "item not found");
        Ok(None)
    }

    /// Trimmed, non-empty `field` texts across all items, in order
    pub async fn field_values(&self, field: &str) -> TemplateResult<Vec<String>> {
        let selector = self.field_selector(field)?;
        let page = self.base.page();
        let mut values = Vec::new();

        for item in self.items().await? {
            let field_locator = item.locator(selector);
            if page.count(&field_locator).await? == 0 {
                continue;
            }
            if let Some(text) = page.text_content(&field_locator).await? {
                let text = text.trim();
                if !text.is_empty() {
                    values.push(text.to_string());
                }
            }
        }

        debug!(field, count = values.len(), "retrieved field values");
        Ok(values)
    }

    /// Click the item at `index`
    pub async fn click_item_by_index(&self, index: usize) -> TemplateResult<()> {
        let item = self.item_by_index(index).await?;
        let _ = self
            .base
            .take_template_screenshot(&format!("before-click-item-{index}"))
            .await?;
        self.base.page().click(&item).await?;
        let _ = self
            .base
            .take_template_screenshot(&format!("after-click-item-{index}"))
            .await?;
        info!(template = %self.base.template_name(), index, "clicked item");
        Ok(())
    }

    /// Click the first item whose `field` matches `value`
    pub async fn click_item_by_field(&self, field: &str, value: &str) -> TemplateResult<()> {
        let item = self
            .find_item_by_field(field, value)
            .await?
            .ok_or_else(|| TemplateError::ItemNotFound {
                field: field.to_string(),
                value: value.to_string(),
            })?;
        let _ = self
            .base
            .take_template_screenshot(&format!("before-click-item-{field}-{value}"))
            .await?;
        self.base.page().click(&item).await?;
        let _ = self
            .base
            .take_template_screenshot(&format!("after-click-item-{field}-{value}"))
            .await?;
        info!(template = %self.base.template_name(), field, value, "clicked item");
        Ok(())
    }

    /// Type `term` into the search input and submit with Enter
    pub async fn search_items(&self, term: &str) -> TemplateResult<()> {
        let input = self.feature(self.config.search_selector.as_deref(), "Search")?;
        let page = self.base.page();
        self.base.wait_for_element(&input).await?;

        let _ = self.base.take_template_screenshot("before-search").await?;
        page.clear(&input).await?;
        page.fill(&input, term).await?;
        page.press(&input, "Enter").await?;
        page.wait_for_timeout(self.base.settings().list_settle()).await?;
        let _ = self.base.take_template_screenshot("after-search").await?;

        info!(template = %self.base.template_name(), term, "searched items");
        Ok(())
    }

    /// Choose a sort option
    pub async fn sort_items(&self, option: &str) -> TemplateResult<()> {
        let select = self.feature(self.config.sort_selector.as_deref(), "Sort")?;
        let page = self.base.page();
        self.base.wait_for_element(&select).await?;

        let _ = self.base.take_template_screenshot("before-sort").await?;
        page.select_option(&select, option).await?;
        page.wait_for_timeout(self.base.settings().list_settle()).await?;
        let _ = self.base.take_template_screenshot("after-sort").await?;

        info!(template = %self.base.template_name(), option, "sorted items");
        Ok(())
    }

    /// Click "load more" if it is visible
    pub async fn load_more_items(&self) -> TemplateResult<LoadMoreOutcome> {
        let button = self.feature(self.config.load_more_button.as_deref(), "Load more")?;
        let page = self.base.page();

        if !page.is_visible(&button).await? {
            info!(template = %self.base.template_name(), "no more items to load");
            return Ok(LoadMoreOutcome::Exhausted);
        }

        let before = self.item_count().await?;
        let _ = self.base.take_template_screenshot("before-load-more").await?;
        page.click(&button).await?;
        page.wait_for_timeout(self.base.settings().load_more_settle())
            .await?;
        let after = self.item_count().await?;
        let _ = self.base.take_template_screenshot("after-load-more").await?;

        info!(template = %self.base.template_name(), before, after, "loaded more items");
        Ok(LoadMoreOutcome::Loaded { before, after })
    }

    /// Empty-state element visible, or no items when none is configured
    pub async fn verify_empty_state(&self) -> TemplateResult<()> {
        match self.config.empty_state_selector.as_deref() {
            Some(selector) => {
                let empty = Locator::new(selector);
                self.base.expect(&empty).to_be_visible().await?;
            }
            None => {
                let count = self.base.page().count(&self.item).await?;
                Assertion::equals(&0, &count).into_result()?;
            }
        }
        let _ = self.base.take_template_screenshot("empty-state").await?;
        info!(template = %self.base.template_name(), "empty state verified");
        Ok(())
    }

    /// At least `min` items present
    pub async fn verify_items_loaded(&self, min: usize) -> TemplateResult<usize> {
        let count = self.item_count().await?;
        Assertion::at_least(count, min).into_result()?;
        let _ = self.base.take_template_screenshot("items-loaded").await?;
        info!(template = %self.base.template_name(), count, min, "items loaded");
        Ok(count)
    }
}

impl Template for ListTemplate {
    fn base(&self) -> &BaseTemplate {
        &self.base
    }

    fn kind(&self) -> TemplateKind {
        TemplateKind::List
    }
}
