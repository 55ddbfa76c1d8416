//! RSS document parsing.
//!
//! Walks the XML event stream once, tracking element depth so that
//! unbalanced documents are rejected, and extracts the first `title`,
//! `link`, `pubDate`, `content:encoded` and `description` found inside
//! each `<item>`.

use fxdash_core::Article;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Encoded,
    Description,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"pubDate" => Some(Field::PubDate),
            b"content:encoded" => Some(Field::Encoded),
            b"description" => Some(Field::Description),
            _ => None,
        }
    }
}

/// Fields collected for the `<item>` currently open.
#[derive(Debug, Default)]
struct ItemFields {
    depth: usize,
    title: Option<String>,
    link: Option<String>,
    pub_date: Option<String>,
    encoded: Option<String>,
    description: Option<String>,
}

impl ItemFields {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::PubDate => &mut self.pub_date,
            Field::Encoded => &mut self.encoded,
            Field::Description => &mut self.description,
        }
    }

    fn is_set(&mut self, field: Field) -> bool {
        self.slot(field).is_some()
    }

    /// First match wins: later occurrences of the same tag are ignored.
    fn set_once(&mut self, field: Field, value: &str) {
        let slot = self.slot(field);
        if slot.is_none() {
            *slot = Some(value.trim().to_string());
        }
    }

    fn into_article(self) -> Article {
        let content = self
            .encoded
            .filter(|c| !c.is_empty())
            .or(self.description)
            .unwrap_or_default();
        Article::new(
            self.title.unwrap_or_default(),
            self.link.unwrap_or_default(),
            self.pub_date.unwrap_or_default(),
            content,
        )
    }
}

/// Text being accumulated for one field element.
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// Parse an RSS XML document into [`Article`]s, preserving feed order.
///
/// # Errors
///
/// - [`ParseError::Xml`] on XML syntax errors, including mismatched end tags,
///   a bare `&` and undefined entities.
/// - [`ParseError::Malformed`] if the document is empty, has no root element,
///   more than one root element, text outside the root, unclosed elements,
///   or an attribute that is not well-formed.
/// - [`ParseError::NoItems`] if the document is well-formed but has no `<item>`.
pub fn parse_feed(xml: &str) -> Result<Vec<Article>, ParseError> {
    let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));

    let mut articles = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut item: Option<ItemFields> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open_element(&mut depth, &mut saw_root)?;
                check_attributes(&e)?;
                let name = e.name();
                match item.as_mut() {
                    Some(fields) if capture.is_none() => {
                        if let Some(field) = Field::from_tag(name.as_ref()) {
                            if !fields.is_set(field) {
                                capture = Some(Capture {
                                    field,
                                    depth,
                                    text: String::new(),
                                });
                            }
                        }
                    }
                    Some(_) => {}
                    None if name.as_ref() == b"item" => item = Some(ItemFields::new(depth)),
                    None => {}
                }
            }
            Event::Empty(e) => {
                open_element(&mut depth, &mut saw_root)?;
                check_attributes(&e)?;
                depth -= 1;
                let name = e.name();
                match item.as_mut() {
                    Some(fields) if capture.is_none() => {
                        if let Some(field) = Field::from_tag(name.as_ref()) {
                            fields.set_once(field, "");
                        }
                    }
                    Some(_) => {}
                    None if name.as_ref() == b"item" => {
                        articles.push(ItemFields::new(depth + 1).into_article());
                    }
                    None => {}
                }
            }
            Event::Text(t) => {
                if let Some(c) = capture.as_mut() {
                    c.text.push_str(&unescape_text(&t)?);
                } else if depth == 0 && !unescape_text(&t)?.trim().is_empty() {
                    return Err(ParseError::Malformed(
                        "text outside the root element".to_string(),
                    ));
                }
            }
            Event::CData(c) => {
                if let Some(cap) = capture.as_mut() {
                    cap.text.push_str(&String::from_utf8_lossy(&c));
                } else if depth == 0 {
                    return Err(ParseError::Malformed(
                        "CDATA outside the root element".to_string(),
                    ));
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err(ParseError::Malformed("unmatched end tag".to_string()));
                }
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let (Some(c), Some(fields)) = (capture.take(), item.as_mut()) {
                        fields.set_once(c.field, &c.text);
                    }
                }
                if item.as_ref().is_some_and(|i| i.depth == depth) {
                    if let Some(fields) = item.take() {
                        articles.push(fields.into_article());
                    }
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::Malformed(format!(
            "document ended with {depth} unclosed element(s)"
        )));
    }
    if !saw_root {
        return Err(ParseError::Malformed(
            "document has no root element".to_string(),
        ));
    }
    if articles.is_empty() {
        return Err(ParseError::NoItems);
    }

    tracing::debug!(count = articles.len(), "parsed feed items");
    Ok(articles)
}

/// Track a newly opened element, rejecting a second root.
fn open_element(depth: &mut usize, saw_root: &mut bool) -> Result<(), ParseError> {
    if *depth == 0 {
        if *saw_root {
            return Err(ParseError::Malformed(
                "more than one root element".to_string(),
            ));
        }
        *saw_root = true;
    }
    *depth += 1;
    Ok(())
}

/// Reject attributes that are not well-formed XML (unquoted values,
/// duplicates, missing `=`).
fn check_attributes(e: &BytesStart<'_>) -> Result<(), ParseError> {
    for attr in e.attributes().with_checks(true) {
        attr.map_err(|err| ParseError::Malformed(format!("invalid attribute: {err}")))?;
    }
    Ok(())
}

/// Unescape XML entities. A bare `&` or an entity XML does not define
/// (`&nbsp;` and friends) is an error.
fn unescape_text(t: &BytesText<'_>) -> Result<String, ParseError> {
    Ok(t.unescape()?.into_owned())
}

/// Strip HTML tags from a string, decode the common entities, and normalize
/// whitespace.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
