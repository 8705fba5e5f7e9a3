use std::fmt;
use std::str::FromStr;

use crate::extractor::events::Event;
use crate::extractor::model::{Harvest, Precedence};
use crate::extractor::rules::TagKind;

/// When a scan may stop before the input runs out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop at the first `body` tag. Every head-level `<meta>` is seen.
    #[default]
    AtBody,
    /// Also stop as soon as the title was attempted and a `<meta>`
    /// description is known. Cheaper, but later `<meta>` tags are missed.
    HeadResolved,
}

impl StopPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtBody => "body",
            Self::HeadResolved => "head",
        }
    }
}

impl fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StopPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "body" | "at_body" => Ok(Self::AtBody),
            "head" | "head_resolved" => Ok(Self::HeadResolved),
            other => Err(format!("unknown stop policy '{}', expected body or head", other)),
        }
    }
}

/// Evaluated after `event` has been folded into `harvest`.
pub fn should_stop(event: &Event, harvest: &Harvest, policy: StopPolicy) -> bool {
    if matches!(event, Event::End(_)) {
        return true;
    }
    if event.tag_name().map(TagKind::of) == Some(TagKind::Body) {
        return true;
    }
    match policy {
        StopPolicy::AtBody => false,
        StopPolicy::HeadResolved => {
            harvest.title_attempted
                && harvest.awaiting.is_none()
                && harvest.description.source() == Some(Precedence::Primary)
        }
    }
}
