//! Structural events over a character stream.
//!
//! `html5ever`'s tokenizer pushes tokens into a sink; [`EventTokenizer`] queues
//! them so callers can pull one event at a time while feeding text in chunks.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read};

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag as RawTag, TagKind as RawTagKind, Token, TokenSink, TokenSinkResult,
    Tokenizer, TokenizerOpts,
};

use crate::fetcher::pipeline::ChunkDecoder;

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// An element start tag. Names and attribute keys are lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub self_closing: bool,
}

impl Tag {
    /// Value of the first attribute named `key`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOfInput {
    Exhausted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(Tag),
    Close(String),
    Text(String),
    End(EndOfInput),
}

impl Event {
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Event::Open(tag) => Some(&tag.name),
            Event::Close(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Default)]
struct EventSink {
    queue: RefCell<VecDeque<Event>>,
    text: RefCell<String>,
}

impl EventSink {
    fn flush_text(&self) {
        let mut text = self.text.borrow_mut();
        if !text.is_empty() {
            self.queue
                .borrow_mut()
                .push_back(Event::Text(std::mem::take(&mut *text)));
        }
    }

    fn push(&self, event: Event) {
        self.flush_text();
        self.queue.borrow_mut().push_back(event);
    }
}

impl TokenSink for EventSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(chars) => {
                self.text.borrow_mut().push_str(&chars);
            }
            Token::TagToken(tag) => return self.process_tag(tag),
            Token::EOFToken => self.push(Event::End(EndOfInput::Exhausted)),
            Token::NullCharacterToken | Token::ParseError(_) => {}
            _ => self.flush_text(),
        }
        TokenSinkResult::Continue
    }
}

impl EventSink {
    fn process_tag(&self, tag: RawTag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        match tag.kind {
            RawTagKind::EndTag => {
                self.push(Event::Close(name));
                TokenSinkResult::Continue
            }
            RawTagKind::StartTag => {
                let next = text_mode(&name);
                let attrs = tag
                    .attrs
                    .into_iter()
                    .map(|attr| Attribute {
                        key: attr.name.local.to_string(),
                        value: attr.value.to_string(),
                    })
                    .collect();
                self.push(Event::Open(Tag {
                    name,
                    attrs,
                    self_closing: tag.self_closing,
                }));
                next
            }
        }
    }
}

// Elements whose content is text, not markup. Without this a `<` inside a
// script would be read as a tag.
fn text_mode(name: &str) -> TokenSinkResult<()> {
    match name {
        "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

/// Incremental tokenizer: feed text chunks, pull [`Event`]s.
pub struct EventTokenizer {
    tokenizer: Tokenizer<EventSink>,
    input: BufferQueue,
    done: bool,
}

impl Default for EventTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTokenizer {
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(EventSink::default(), TokenizerOpts::default()),
            input: BufferQueue::default(),
            done: false,
        }
    }

    pub fn feed(&mut self, chunk: &str) {
        if self.done || chunk.is_empty() {
            return;
        }
        self.input.push_back(StrTendril::from_slice(chunk));
        let _ = self.tokenizer.feed(&self.input);
    }

    /// Signals end of input; queues any trailing text and an `Exhausted` end.
    pub fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        let _ = self.tokenizer.feed(&self.input);
        self.tokenizer.end();
    }

    /// Signals that the source failed; no further input will be accepted.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.done {
            return;
        }
        self.done = true;
        self.tokenizer
            .sink
            .push(Event::End(EndOfInput::Failed(reason.into())));
    }

    pub fn next_event(&mut self) -> Option<Event> {
        self.tokenizer.sink.queue.borrow_mut().pop_front()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Lazy event sequence over UTF-8 text read from `R`.
///
/// Ends with exactly one [`Event::End`]; read errors become
/// [`EndOfInput::Failed`].
pub struct Events<R> {
    reader: R,
    tokenizer: EventTokenizer,
    decoder: ChunkDecoder,
    buf: Vec<u8>,
    ended: bool,
}

impl<R: Read> Events<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokenizer: EventTokenizer::new(),
            decoder: ChunkDecoder::new(encoding_rs::UTF_8),
            buf: vec![0; READ_CHUNK],
            ended: false,
        }
    }

    fn fill(&mut self) {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    let tail = self.decoder.decode(&[], true);
                    self.tokenizer.feed(&tail);
                    self.tokenizer.finish();
                    return;
                }
                Ok(n) => {
                    let text = self.decoder.decode(&self.buf[..n], false);
                    self.tokenizer.feed(&text);
                    return;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.tokenizer.fail(e.to_string());
                    return;
                }
            }
        }
    }
}

impl<R: Read> Iterator for Events<R> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.ended {
            return None;
        }
        loop {
            if let Some(event) = self.tokenizer.next_event() {
                if matches!(event, Event::End(_)) {
                    self.ended = true;
                }
                return Some(event);
            }
            if self.tokenizer.is_done() {
                // the tokenizer always queues an end event; this is unreachable in practice
                self.ended = true;
                return Some(Event::End(EndOfInput::Exhausted));
            }
            self.fill();
        }
    }
}

/// Convenience: tokenizes a complete document.
pub fn events_from_str(html: &str) -> Vec<Event> {
    Events::new(html.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(name: &str) -> Event {
        Event::Open(Tag {
            name: name.to_string(),
            attrs: Vec::new(),
            self_closing: false,
        })
    }

    #[test]
    fn emits_open_text_close_and_end() {
        let events = events_from_str("<head><title> Hi </title></head>");
        assert_eq!(
            events,
            vec![
                open("head"),
                open("title"),
                Event::Text(" Hi ".to_string()),
                Event::Close("title".to_string()),
                Event::Close("head".to_string()),
                Event::End(EndOfInput::Exhausted),
            ]
        );
    }

    #[test]
    fn lowercases_names_and_keeps_attribute_order() {
        let events = events_from_str(r#"<META Name="Description" CONTENT="x"/>"#);
        match &events[0] {
            Event::Open(tag) => {
                assert_eq!(tag.name, "meta");
                assert!(tag.self_closing);
                assert_eq!(tag.attrs[0].key, "name");
                assert_eq!(tag.attrs[0].value, "Description");
                assert_eq!(tag.attr("content"), Some("x"));
            }
            other => panic!("Expected open tag, got {:?}", other),
        }
    }

    #[test]
    fn coalesces_text_split_by_character_references() {
        let events = events_from_str("<title>Fish &amp; Chips</title>");
        assert_eq!(events[1], Event::Text("Fish & Chips".to_string()));
        assert_eq!(events[2], Event::Close("title".to_string()));
    }

    #[test]
    fn script_content_is_text() {
        let events = events_from_str("<script>if (a<b) { x = '<body>'; }</script><p>");
        assert_eq!(events[0], open("script"));
        assert_eq!(
            events[1],
            Event::Text("if (a<b) { x = '<body>'; }".to_string())
        );
        assert_eq!(events[2], Event::Close("script".to_string()));
        assert_eq!(events[3], open("p"));
    }

    #[test]
    fn chunked_feed_matches_single_feed() {
        let html = "<html><head><title>Chunked</title><meta name=keywords content=\"a,b\"></head>";
        let mut tokenizer = EventTokenizer::new();
        for piece in html.as_bytes().chunks(3) {
            tokenizer.feed(std::str::from_utf8(piece).unwrap());
        }
        tokenizer.finish();

        let mut chunked = Vec::new();
        while let Some(event) = tokenizer.next_event() {
            chunked.push(event);
        }
        assert_eq!(chunked, events_from_str(html));
    }

    #[test]
    fn read_failure_ends_with_failed() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("connection reset"))
            }
        }

        let events: Vec<Event> = Events::new(Broken).collect();
        assert_eq!(
            events,
            vec![Event::End(EndOfInput::Failed("connection reset".to_string()))]
        );
    }

    #[test]
    fn empty_input_still_terminates() {
        assert_eq!(events_from_str(""), vec![Event::End(EndOfInput::Exhausted)]);
    }
}
