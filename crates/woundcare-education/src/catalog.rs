//! Typed education catalogs.
//!
//! A locale bundle is a JSON document whose `education` object holds flat
//! camelCase keys (`goodExample1Title`, `dailyCareContent`, ...). It is read
//! exactly once into a [`Catalog`]; nothing downstream inspects raw JSON.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LocaleError;

/// Placeholder shown when a bundle does not translate `noTipsAvailable`.
pub const DEFAULT_NO_TIPS: &str = "No tips available";

/// Assessment of a wound example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WoundStatus {
    Good,
    Bad,
    Warning,
}

/// Icon shown next to a care topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopicIcon {
    Droplets,
    Footprints,
    AlertTriangle,
    Heart,
}

/// One good or bad wound example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WoundExample {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: WoundStatus,
    pub image_description: String,
    /// `None` when the bundle had no usable tip list.
    pub tips: Option<Vec<String>>,
}

/// One care topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationTopic {
    pub id: String,
    pub icon: TopicIcon,
    pub title: String,
    pub description: String,
    /// Ordered instructions.
    pub content: Vec<String>,
}

/// Static page strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLabels {
    pub title: String,
    pub subtitle: String,
    pub daily_reminder: String,
    pub daily_reminder_text: String,
    pub wound_assessment_guide: String,
    pub good_signs: String,
    pub warning_signs: String,
    pub good_sign: String,
    pub warning_sign: String,
    pub what_to_look_for: String,
    pub recommended_actions: String,
    pub care_topics: String,
    pub no_tips_available: String,
}

/// Immutable education content for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub locale: String,
    pub labels: PageLabels,
    pub good_examples: Vec<WoundExample>,
    pub bad_examples: Vec<WoundExample>,
    pub topics: Vec<EducationTopic>,
}

/// Topic ids, bundle key prefixes and icons, in display order.
const TOPICS: [(&str, &str, TopicIcon); 4] = [
    ("daily-care", "dailyCare", TopicIcon::Droplets),
    ("foot-protection", "footProtection", TopicIcon::Footprints),
    ("warning-signs", "warningSigns", TopicIcon::AlertTriangle),
    ("nutrition", "nutrition", TopicIcon::Heart),
];

/// Number of examples per status group.
const EXAMPLES_PER_GROUP: usize = 3;

impl Catalog {
    /// Parses a bundle document.
    pub fn from_json(locale: &str, json: &str) -> Result<Self, LocaleError> {
        let bundle: Value = serde_json::from_str(json).map_err(|source| LocaleError::Parse {
            locale: locale.to_string(),
            source,
        })?;
        Self::from_bundle(locale, &bundle)
    }

    /// Builds a catalog from a parsed bundle, validating every key.
    pub fn from_bundle(locale: &str, bundle: &Value) -> Result<Self, LocaleError> {
        let section = bundle
            .get("education")
            .and_then(Value::as_object)
            .ok_or_else(|| LocaleError::MissingSection {
                locale: locale.to_string(),
            })?;
        let reader = BundleReader { locale, section };

        let labels = PageLabels {
            title: reader.string("title")?,
            subtitle: reader.string("subtitle")?,
            daily_reminder: reader.string("dailyReminder")?,
            daily_reminder_text: reader.string("dailyReminderText")?,
            wound_assessment_guide: reader.string("woundAssessmentGuide")?,
            good_signs: reader.string("goodSigns")?,
            warning_signs: reader.string("warningSigns")?,
            good_sign: reader.string("goodSign")?,
            warning_sign: reader.string("warningSign")?,
            what_to_look_for: reader.string("whatToLookFor")?,
            recommended_actions: reader.string("recommendedActions")?,
            care_topics: reader.string("careTopics")?,
            no_tips_available: reader
                .optional_string("noTipsAvailable")?
                .unwrap_or_else(|| DEFAULT_NO_TIPS.to_string()),
        };

        let good_examples = reader.examples("good", WoundStatus::Good)?;
        let bad_examples = reader.examples("bad", WoundStatus::Bad)?;

        let topics = TOPICS
            .iter()
            .map(|(id, prefix, icon)| -> Result<EducationTopic, LocaleError> {
                Ok(EducationTopic {
                    id: (*id).to_string(),
                    icon: *icon,
                    title: reader.string(&format!("{prefix}Title"))?,
                    description: reader.string(&format!("{prefix}Description"))?,
                    content: reader.string_list(&format!("{prefix}Content"))?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            locale: locale.to_string(),
            labels,
            good_examples,
            bad_examples,
            topics,
        })
    }

    /// Looks up a wound example in either group.
    #[must_use]
    pub fn example(&self, id: &str) -> Option<&WoundExample> {
        self.good_examples
            .iter()
            .chain(&self.bad_examples)
            .find(|e| e.id == id)
    }

    /// Looks up a care topic.
    #[must_use]
    pub fn topic(&self, id: &str) -> Option<&EducationTopic> {
        self.topics.iter().find(|t| t.id == id)
    }
}

struct BundleReader<'a> {
    locale: &'a str,
    section: &'a Map<String, Value>,
}

impl BundleReader<'_> {
    fn string(&self, key: &str) -> Result<String, LocaleError> {
        self.optional_string(key)?
            .ok_or_else(|| LocaleError::missing_key(self.locale, key))
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, LocaleError> {
        match self.section.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(LocaleError::wrong_type(self.locale, key, "a string")),
        }
    }

    fn string_list(&self, key: &str) -> Result<Vec<String>, LocaleError> {
        let value = self
            .section
            .get(key)
            .ok_or_else(|| LocaleError::missing_key(self.locale, key))?;
        as_string_list(value)
            .ok_or_else(|| LocaleError::wrong_type(self.locale, key, "an array of strings"))
    }

    /// Tip lists are display-only, so a malformed one degrades to `None`
    /// instead of failing the bundle.
    fn tips(&self, key: &str) -> Option<Vec<String>> {
        let tips = self.section.get(key).and_then(as_string_list);
        if tips.is_none() {
            tracing::warn!(locale = self.locale, key, "Tip list missing or not an array of strings");
        }
        tips
    }

    fn examples(&self, group: &str, status: WoundStatus) -> Result<Vec<WoundExample>, LocaleError> {
        (1..=EXAMPLES_PER_GROUP)
            .map(|n| -> Result<WoundExample, LocaleError> {
                let prefix = format!("{group}Example{n}");
                Ok(WoundExample {
                    id: format!("{group}-{n}"),
                    title: self.string(&format!("{prefix}Title"))?,
                    description: self.string(&format!("{prefix}Description"))?,
                    status,
                    image_description: self.string(&format!("{prefix}ImageDesc"))?,
                    tips: self.tips(&format!("{prefix}Tips")),
                })
            })
            .collect()
    }
}

fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
