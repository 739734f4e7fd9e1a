//! Selection state of one education browsing session.
//!
//! Two independent pointers: the open wound example and the open care topic.
//! Selecting replaces the pointer, dismissing clears it. There is no other
//! state beyond the active example tab.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, EducationTopic, WoundExample};
use crate::error::EducationError;
use crate::registry::LocaleRegistry;
use crate::view::{ExampleCard, ExampleDetail, TopicDetail};

/// Example list tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleTab {
    #[default]
    Good,
    Bad,
}

/// Browser state over one locale's catalog.
#[derive(Debug, Clone)]
pub struct EducationBrowser {
    catalog: Arc<Catalog>,
    tab: ExampleTab,
    selected_example: Option<WoundExample>,
    selected_topic: Option<EducationTopic>,
}

impl EducationBrowser {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            tab: ExampleTab::default(),
            selected_example: None,
            selected_topic: None,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn tab(&self) -> ExampleTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: ExampleTab) {
        self.tab = tab;
    }

    /// Cards of the active tab.
    #[must_use]
    pub fn visible_examples(&self) -> Vec<ExampleCard> {
        let examples = match self.tab {
            ExampleTab::Good => &self.catalog.good_examples,
            ExampleTab::Bad => &self.catalog.bad_examples,
        };
        examples.iter().map(ExampleCard::from).collect()
    }

    /// Opens the example dialog, replacing any example already open.
    pub fn select_example(&mut self, id: &str) -> Result<ExampleDetail, EducationError> {
        let example = self
            .catalog
            .example(id)
            .ok_or_else(|| EducationError::UnknownExample(id.to_string()))?;
        self.selected_example = Some(example.clone());
        Ok(ExampleDetail::new(example, &self.catalog.labels))
    }

    pub fn dismiss_example(&mut self) {
        self.selected_example = None;
    }

    /// Opens the topic dialog, replacing any topic already open.
    pub fn select_topic(&mut self, id: &str) -> Result<TopicDetail, EducationError> {
        let topic = self
            .catalog
            .topic(id)
            .ok_or_else(|| EducationError::UnknownTopic(id.to_string()))?;
        self.selected_topic = Some(topic.clone());
        Ok(TopicDetail::from(topic))
    }

    pub fn dismiss_topic(&mut self) {
        self.selected_topic = None;
    }

    /// Detail of the open example dialog.
    #[must_use]
    pub fn example_dialog(&self) -> Option<ExampleDetail> {
        self.selected_example
            .as_ref()
            .map(|e| ExampleDetail::new(e, &self.catalog.labels))
    }

    /// Detail of the open topic dialog.
    #[must_use]
    pub fn topic_dialog(&self) -> Option<TopicDetail> {
        self.selected_topic.as_ref().map(TopicDetail::from)
    }

    /// Switches to another locale's catalog.
    ///
    /// Open dialogs stay open and are re-read by id from the new catalog.
    pub fn switch_locale(&mut self, registry: &LocaleRegistry, locale: &str) {
        self.catalog = registry.resolve(Some(locale));
        self.selected_example = self
            .selected_example
            .take()
            .and_then(|e| self.catalog.example(&e.id).cloned());
        self.selected_topic = self
            .selected_topic
            .take()
            .and_then(|t| self.catalog.topic(&t.id).cloned());
    }
}
