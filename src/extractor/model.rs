use serde::{Deserialize, Serialize};

use crate::fetcher::FetchError;

/// Metadata summary of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: String,
    pub description: String,
    pub section: String,
    /// `article:tag` values joined with `,`.
    #[serde(rename = "tag")]
    pub tags: String,
    pub keywords: String,
    pub status_code: u16,
}

impl MetadataRecord {
    /// The record reported alongside a failed fetch: empty apart from the
    /// status code that was known when it failed.
    pub fn for_failure(err: &FetchError) -> Self {
        Self {
            status_code: err.status_code(),
            ..Self::default()
        }
    }
}

/// How trustworthy the source of a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Fallback,
    Primary,
}

/// What happens when a second value of the same precedence arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    FirstWins,
    Overwrite,
}

/// A single field together with the precedence of whoever wrote it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    value: Option<String>,
    source: Option<Precedence>,
}

impl Slot {
    /// Offers a value; returns whether it was taken. Higher precedence always
    /// replaces lower, lower never replaces higher, and equal precedence is
    /// decided by `policy`.
    pub fn offer(&mut self, value: &str, precedence: Precedence, policy: WritePolicy) -> bool {
        let accept = match self.source {
            None => true,
            Some(current) if precedence > current => true,
            Some(current) if precedence < current => false,
            Some(_) => policy == WritePolicy::Overwrite,
        };
        if accept {
            self.value = Some(value.trim().to_string());
            self.source = Some(precedence);
        }
        accept
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn source(&self) -> Option<Precedence> {
        self.source
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    fn into_string(self) -> String {
        self.value.unwrap_or_default()
    }
}

/// Element whose text content is wanted from the very next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    Title,
    Description,
}

/// Accumulator threaded through one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub title: Slot,
    pub description: Slot,
    pub section: Slot,
    pub keywords: Slot,
    pub tags: Vec<String>,
    pub(crate) awaiting: Option<TextTarget>,
    pub(crate) title_attempted: bool,
    pub(crate) description_element_attempted: bool,
}

impl Harvest {
    pub fn joined_tags(&self) -> String {
        self.tags.join(",")
    }

    pub fn into_record(self) -> MetadataRecord {
        let tags = self.joined_tags();
        MetadataRecord {
            title: self.title.into_string(),
            description: self.description.into_string(),
            section: self.section.into_string(),
            tags,
            keywords: self.keywords.into_string(),
            status_code: 0,
        }
    }
}
