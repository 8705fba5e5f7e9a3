use std::fs;
use std::io::{self, Read};

use crate::extractor::{ExtractOptions, MetadataRecord, StopPolicy, extract_reader, extract_str};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{}", name))
        .expect("Failed to read test fixture")
}

fn extract(html: &str) -> MetadataRecord {
    extract_str(html, ExtractOptions::default())
}

#[test]
fn test_extract_article_head() {
    let record = extract(&fixture("article.html"));

    assert_eq!(record.title, "Rust 2026 Survey Results | The Systems Weekly");
    assert_eq!(
        record.description,
        "What four thousand developers said about async, tooling and compile times."
    );
    assert_eq!(record.keywords, "rust, survey, async, tooling");
    assert_eq!(record.section, "Programming");
    // the tag inside <body> is never reached
    assert_eq!(record.tags, "rust,survey,community");
    assert_eq!(record.status_code, 0);
}

#[test]
fn test_head_resolved_policy_stops_early() {
    let record = extract_str(
        &fixture("article.html"),
        ExtractOptions::with_stop(StopPolicy::HeadResolved),
    );

    assert_eq!(record.title, "Rust 2026 Survey Results | The Systems Weekly");
    assert!(record.description.starts_with("What four thousand"));
    assert_eq!(record.keywords, "");
    assert_eq!(record.section, "");
    assert_eq!(record.tags, "");
}

#[test]
fn test_description_element_fallback() {
    let record = extract(&fixture("description_element.html"));

    assert_eq!(record.title, "Feed Item");
    assert_eq!(record.description, "Literal element description");
    assert_eq!(record.section, "News");
}

#[test]
fn test_truncated_document_keeps_what_was_seen() {
    let record = extract(&fixture("truncated.html"));

    assert_eq!(record.title, "Cut Short");
    assert_eq!(record.tags, "first,second");
    // the last <meta> never closes, so the tokenizer drops it
    assert_eq!(record.description, "");
}

#[test]
fn test_meta_description_wins_in_either_order() {
    let meta_first = r#"<head><meta name="description" content="meta"><description>element</description></head>"#;
    let element_first = r#"<head><description>element</description><meta name="DESCRIPTION" content=" meta "></head>"#;

    assert_eq!(extract(meta_first).description, "meta");
    assert_eq!(extract(element_first).description, "meta");
}

#[test]
fn test_meta_without_content_leaves_description_unset() {
    let record = extract(r#"<head><meta name="description"><title>x</title></head>"#);
    assert_eq!(record.description, "");
    assert_eq!(record.title, "x");
}

#[test]
fn test_tag_after_description_element_is_still_read() {
    let record = extract(r#"<description><meta name="keywords" content="k"></description>"#);
    assert_eq!(record.keywords, "k");
    assert_eq!(record.description, "");
}

#[test]
fn test_first_title_wins() {
    let record = extract("<head><title>First</title><title>Second</title></head>");
    assert_eq!(record.title, "First");
}

#[test]
fn test_empty_title_is_not_retried() {
    let record = extract("<head><title></title><title>Second</title></head>");
    assert_eq!(record.title, "");
}

#[test]
fn test_self_closing_title_is_not_read() {
    let record = extract(r#"<head><title/>Hello</title><meta name=keywords content=k></head><body>"#);
    assert_eq!(record.title, "");
    assert_eq!(record.keywords, "k");
}

#[test]
fn test_self_closing_description_is_not_read() {
    let record = extract("<head><description/>stray text<title>T</title></head><body>");
    assert_eq!(record.description, "");
    assert_eq!(record.title, "T");
}

#[test]
fn test_head_resolved_waits_for_meta_after_description_element() {
    let html = r#"<head><title>T</title><description>element</description><meta name="description" content="meta"></head><body>"#;
    let record = extract_str(html, ExtractOptions::with_stop(StopPolicy::HeadResolved));

    assert_eq!(record.title, "T");
    assert_eq!(record.description, "meta");
}

#[test]
fn test_title_entities_are_decoded() {
    let record = extract("<title>  Fish &amp; Chips &lt;3 </title>");
    assert_eq!(record.title, "Fish & Chips <3");
}

#[test]
fn test_scan_stops_at_body() {
    let html = r#"<html><head><title>T</title></head><body><meta name="keywords" content="late"><meta property="article:tag" content="late"></body></html>"#;
    let record = extract(html);

    assert_eq!(record.title, "T");
    assert_eq!(record.keywords, "");
    assert_eq!(record.tags, "");
}

#[test]
fn test_body_inside_script_does_not_stop_the_scan() {
    let html = r#"<head><script>var s = "<body>";</script><meta name="keywords" content="k"></head>"#;
    assert_eq!(extract(html).keywords, "k");
}

#[test]
fn test_duplicate_tags_are_kept_in_order() {
    let html = r#"<meta property="article:tag" content="b"><meta property="Article:Tag" content="a"><meta property="article:tag" content="b">"#;
    assert_eq!(extract(html).tags, "b,a,b");
}

#[test]
fn test_no_tags_means_empty_field() {
    assert_eq!(extract("<title>x</title>").tags, "");
}

#[test]
fn test_empty_and_garbage_input() {
    assert_eq!(extract(""), MetadataRecord::default());
    assert_eq!(extract("<<<>>> &&& </ <!-- "), MetadataRecord::default());
}

#[test]
fn test_extraction_is_idempotent() {
    let html = fixture("article.html");
    assert_eq!(extract(&html), extract(&html));
}

#[test]
fn test_reader_does_not_read_past_body() {
    struct Counting<'a> {
        inner: &'a [u8],
        read: usize,
    }
    impl Read for Counting<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.read += n;
            Ok(n)
        }
    }

    let mut html = String::from("<html><head><title>Early</title></head><body>");
    html.push_str(&"<p>filler</p>".repeat(10_000));
    let mut reader = Counting {
        inner: html.as_bytes(),
        read: 0,
    };

    let record = extract_reader(&mut reader, ExtractOptions::default());

    assert_eq!(record.title, "Early");
    assert!(reader.read < html.len() / 4);
}

#[test]
fn test_read_error_truncates_without_failing() {
    struct FailsAfterHead {
        head: &'static [u8],
    }
    impl Read for FailsAfterHead {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.head.is_empty() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.head.read(buf)
        }
    }

    let reader = FailsAfterHead {
        head: br#"<head><title>Partial</title><meta name="keywords" content="k">"#,
    };
    let record = extract_reader(reader, ExtractOptions::default());

    assert_eq!(record.title, "Partial");
    assert_eq!(record.keywords, "k");
}

#[test]
fn test_multibyte_text_split_across_reads() {
    struct OneByte<'a>(&'a [u8]);
    impl Read for OneByte<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    let html = r#"<title>Привет, 世界</title><meta property="article:tag" content="日本">"#;
    let record = extract_reader(OneByte(html.as_bytes()), ExtractOptions::default());

    assert_eq!(record.title, "Привет, 世界");
    assert_eq!(record.tags, "日本");
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extract(&html);
        }

        #[test]
        fn test_title_is_trimmed(
            lead in "[ \t\n]{0,4}",
            title in "[A-Za-z0-9][A-Za-z0-9 .,:|-]{0,40}[A-Za-z0-9]",
            trail in "[ \t\n]{0,4}",
        ) {
            let html = format!("<html><head><title>{}{}{}</title></head><body></body>", lead, title, trail);
            prop_assert_eq!(extract(&html).title, title);
        }

        #[test]
        fn test_tags_keep_encounter_order(tags in prop::collection::vec("[a-z0-9]{1,12}", 0..8)) {
            let mut html = String::from("<head>");
            for tag in &tags {
                html.push_str(&format!(r#"<meta property="article:tag" content="{}">"#, tag));
            }
            html.push_str("</head><body>");
            prop_assert_eq!(extract(&html).tags, tags.join(","));
        }

        #[test]
        fn test_meta_description_beats_element(
            meta in "[a-z]{1,10}",
            element in "[A-Z]{1,10}",
            element_first in any::<bool>(),
        ) {
            let meta_tag = format!(r#"<meta name="Description" content=" {} ">"#, meta);
            let element_tag = format!("<description>{}</description>", element);
            let html = if element_first {
                format!("<head>{}{}</head>", element_tag, meta_tag)
            } else {
                format!("<head>{}{}</head>", meta_tag, element_tag)
            };
            prop_assert_eq!(extract(&html).description, meta);
        }
    }
}
