//! Render-ready views of catalog entries.

use serde::Serialize;

use crate::catalog::{Catalog, EducationTopic, PageLabels, TopicIcon, WoundExample, WoundStatus};

/// Card shown in an example list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleCard {
    pub id: String,
    pub status: WoundStatus,
    pub title: String,
    pub description: String,
}

impl From<&WoundExample> for ExampleCard {
    fn from(example: &WoundExample) -> Self {
        Self {
            id: example.id.clone(),
            status: example.status,
            title: example.title.clone(),
            description: example.description.clone(),
        }
    }
}

/// Card shown in the care topic grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCard {
    pub id: String,
    pub icon: TopicIcon,
    pub title: String,
}

impl From<&EducationTopic> for TopicCard {
    fn from(topic: &EducationTopic) -> Self {
        Self {
            id: topic.id.clone(),
            icon: topic.icon,
            title: topic.title.clone(),
        }
    }
}

/// The education landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPage {
    pub locale: String,
    pub labels: PageLabels,
    pub good_examples: Vec<ExampleCard>,
    pub bad_examples: Vec<ExampleCard>,
    pub topics: Vec<TopicCard>,
}

impl EducationPage {
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            locale: catalog.locale.clone(),
            labels: catalog.labels.clone(),
            good_examples: catalog.good_examples.iter().map(ExampleCard::from).collect(),
            bad_examples: catalog.bad_examples.iter().map(ExampleCard::from).collect(),
            topics: catalog.topics.iter().map(TopicCard::from).collect(),
        }
    }
}

/// Recommended actions of an example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Tips {
    /// Tips in stored order.
    Items(Vec<String>),
    /// Shown instead of an empty or missing list.
    Placeholder(String),
}

impl Tips {
    /// Lines to display, one per list item.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        match self {
            Self::Items(items) => items.iter().map(String::as_str).collect(),
            Self::Placeholder(text) => vec![text.as_str()],
        }
    }
}

/// Detail dialog of a wound example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleDetail {
    pub id: String,
    pub status: WoundStatus,
    pub badge: String,
    pub title: String,
    pub description: String,
    pub what_to_look_for_label: String,
    pub image_description: String,
    pub recommended_actions_label: String,
    pub tips: Tips,
}

impl ExampleDetail {
    /// Builds the detail view; the badge reads "good sign" only for
    /// [`WoundStatus::Good`].
    #[must_use]
    pub fn new(example: &WoundExample, labels: &PageLabels) -> Self {
        let badge = match example.status {
            WoundStatus::Good => &labels.good_sign,
            WoundStatus::Bad | WoundStatus::Warning => &labels.warning_sign,
        };
        let tips = match &example.tips {
            Some(tips) if !tips.is_empty() => Tips::Items(tips.clone()),
            _ => Tips::Placeholder(labels.no_tips_available.clone()),
        };
        Self {
            id: example.id.clone(),
            status: example.status,
            badge: badge.clone(),
            title: example.title.clone(),
            description: example.description.clone(),
            what_to_look_for_label: labels.what_to_look_for.clone(),
            image_description: example.image_description.clone(),
            recommended_actions_label: labels.recommended_actions.clone(),
            tips,
        }
    }
}

/// One numbered instruction of a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicStep {
    /// 1-based position.
    pub number: usize,
    pub text: String,
}

/// Detail dialog of a care topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetail {
    pub id: String,
    pub icon: TopicIcon,
    pub title: String,
    pub description: String,
    pub steps: Vec<TopicStep>,
}

impl From<&EducationTopic> for TopicDetail {
    fn from(topic: &EducationTopic) -> Self {
        Self {
            id: topic.id.clone(),
            icon: topic.icon,
            title: topic.title.clone(),
            description: topic.description.clone(),
            steps: topic
                .content
                .iter()
                .enumerate()
                .map(|(i, text)| TopicStep {
                    number: i + 1,
                    text: text.clone(),
                })
                .collect(),
        }
    }
}
