//! # woundcare-education
//!
//! Wound-care education content for the Woundcare portal.
//!
//! Locale bundles (JSON translation documents) are validated once at load and
//! turned into immutable [`Catalog`]s of wound examples and care topics. The
//! [`EducationBrowser`] holds the per-session selection state, and [`http`]
//! exposes the page and detail views.

pub mod browser;
pub mod catalog;
pub mod error;
pub mod http;
pub mod registry;
pub mod view;

pub use browser::{EducationBrowser, ExampleTab};
pub use catalog::{
    Catalog, EducationTopic, PageLabels, TopicIcon, WoundExample, WoundStatus,
};
pub use error::{EducationError, LocaleError};
pub use http::{EducationState, education_routes};
pub use registry::LocaleRegistry;
pub use view::{EducationPage, ExampleCard, ExampleDetail, Tips, TopicCard, TopicDetail, TopicStep};
