pub mod events;
pub mod model;
pub mod policy;
pub mod rules;

#[cfg(test)]
mod tests;

pub use events::{EndOfInput, Event, EventTokenizer, Events, Tag};
pub use model::{Harvest, MetadataRecord};
pub use policy::{StopPolicy, should_stop};

use std::io::Read;
use std::ops::ControlFlow;

use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub stop: StopPolicy,
}

impl ExtractOptions {
    pub fn with_stop(stop: StopPolicy) -> Self {
        Self { stop }
    }
}

/// One step of the scan: fold `event` in, then decide whether to go on.
pub fn advance(
    harvest: Harvest,
    event: &Event,
    policy: StopPolicy,
) -> ControlFlow<Harvest, Harvest> {
    let harvest = rules::apply(harvest, event);
    if should_stop(event, &harvest, policy) {
        if let Event::End(EndOfInput::Failed(reason)) = event {
            debug!("Scan truncated by input failure: {}", reason);
        }
        ControlFlow::Break(harvest)
    } else {
        ControlFlow::Continue(harvest)
    }
}

/// Scans an event sequence and returns whatever metadata it carried.
///
/// Never fails: malformed or truncated input yields a sparse record.
pub fn extract_events<I>(events: I, options: ExtractOptions) -> MetadataRecord
where
    I: IntoIterator<Item = Event>,
{
    let outcome = events
        .into_iter()
        .try_fold(Harvest::default(), |harvest, event| {
            advance(harvest, &event, options.stop)
        });
    match outcome {
        ControlFlow::Break(harvest) | ControlFlow::Continue(harvest) => harvest.into_record(),
    }
}

/// Scans UTF-8 text read from `reader`, reading no further than needed.
pub fn extract_reader<R: Read>(reader: R, options: ExtractOptions) -> MetadataRecord {
    extract_events(Events::new(reader), options)
}

pub fn extract_str(html: &str, options: ExtractOptions) -> MetadataRecord {
    extract_reader(html.as_bytes(), options)
}
