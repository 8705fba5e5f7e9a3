use crate::extractor::events::{Event, Tag};
use crate::extractor::model::{Harvest, Precedence, TextTarget, WritePolicy};

/// Tag names the extractor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Title,
    Description,
    Meta,
    Body,
    Other,
}

impl TagKind {
    pub fn of(name: &str) -> Self {
        match name {
            "title" => Self::Title,
            "description" => Self::Description,
            "meta" => Self::Meta,
            "body" => Self::Body,
            _ => Self::Other,
        }
    }
}

/// Field a `<meta>` tag contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    Description,
    Keywords,
    Section,
    Tag,
}

/// Fields named by a `<meta>` tag, in attribute order.
///
/// A recognized `name` attribute settles the tag; `property` attributes seen
/// before it still count.
pub fn meta_fields(tag: &Tag) -> Vec<MetaField> {
    let mut fields = Vec::new();
    for attr in &tag.attrs {
        match attr.key.as_str() {
            "name" => {
                let value = attr.value.to_lowercase();
                match value.as_str() {
                    "description" => {
                        fields.push(MetaField::Description);
                        break;
                    }
                    "keywords" => {
                        fields.push(MetaField::Keywords);
                        break;
                    }
                    _ => {}
                }
            }
            "property" => match attr.value.to_lowercase().as_str() {
                "article:section" => fields.push(MetaField::Section),
                "article:tag" => fields.push(MetaField::Tag),
                _ => {}
            },
            _ => {}
        }
    }
    fields
}

/// Folds one event into the harvest.
pub fn apply(mut harvest: Harvest, event: &Event) -> Harvest {
    let awaiting = harvest.awaiting.take();

    match event {
        Event::Text(text) => match awaiting {
            Some(TextTarget::Title) => {
                harvest
                    .title
                    .offer(text, Precedence::Primary, WritePolicy::FirstWins);
            }
            Some(TextTarget::Description) => {
                harvest
                    .description
                    .offer(text, Precedence::Fallback, WritePolicy::FirstWins);
            }
            None => {}
        },
        Event::Open(tag) => match TagKind::of(&tag.name) {
            // `<title/>` uses up the single title attempt without reading text.
            TagKind::Title if !harvest.title_attempted => {
                harvest.title_attempted = true;
                if !tag.self_closing {
                    harvest.awaiting = Some(TextTarget::Title);
                }
            }
            TagKind::Description
                if !tag.self_closing && !harvest.description_element_attempted =>
            {
                harvest.description_element_attempted = true;
                harvest.awaiting = Some(TextTarget::Description);
            }
            TagKind::Meta => apply_meta(&mut harvest, tag),
            _ => {}
        },
        Event::Close(_) | Event::End(_) => {}
    }

    harvest
}

fn apply_meta(harvest: &mut Harvest, tag: &Tag) {
    let Some(content) = tag.attr("content") else {
        return;
    };
    for field in meta_fields(tag) {
        match field {
            MetaField::Description => {
                harvest
                    .description
                    .offer(content, Precedence::Primary, WritePolicy::Overwrite);
            }
            MetaField::Keywords => {
                harvest
                    .keywords
                    .offer(content, Precedence::Primary, WritePolicy::Overwrite);
            }
            MetaField::Section => {
                harvest
                    .section
                    .offer(content, Precedence::Primary, WritePolicy::Overwrite);
            }
            MetaField::Tag => harvest.tags.push(content.trim().to_string()),
        }
    }
}
