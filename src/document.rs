//! Element and attribute queries over the text of an XML project file.
//!
//! The document is kept as the original text. Queries locate elements by
//! exact name and hand back byte spans, and mutations splice new values into
//! those spans, so everything that is not touched is written back unchanged.
//! Anything inside `<!-- -->` comments is invisible to queries.

use crate::error::{BumpError, Result};
use log::debug;
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: Range<usize>,
}

/// A located element. Only valid for the document state it was queried from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    ordinal: usize,
    tag: Range<usize>,
    self_closing: bool,
    content: Option<Range<usize>>,
    attributes: Vec<Attribute>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position among the elements sharing this name, in document order.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// True for `<Name/>` and `<Name ... />`.
    pub fn is_empty_tag(&self) -> bool {
        self.self_closing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn parse(text: impl Into<String>) -> Self {
        Document { text: text.into() }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BumpError::NotFound(path.to_path_buf()));
        }
        debug!("Loading document '{}'", path.display());
        Ok(Document::parse(std::fs::read_to_string(path)?))
    }

    /// Writes the document to `path` with exactly one trailing newline.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!("Saving document '{}'", path.display());
        let mut contents = self.text.trim_end().to_string();
        contents.push('\n');
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Every element named `name`, in document order.
    pub fn elements(&self, name: &str) -> Result<Vec<Element>> {
        let comments = comment_spans(&self.text)?;
        let escaped = regex::escape(name);
        let start_tag = Regex::new(&format!(r"<{escaped}(\s[^>]*)?/?>"))?;
        let end_tag = Regex::new(&format!(r"^([^<]*)</{escaped}\s*>"))?;
        let attribute = attribute_regex()?;

        let mut elements = Vec::new();
        for captures in start_tag.captures_iter(&self.text) {
            let Some(tag) = captures.get(0) else { continue };
            if comments.iter().any(|c| c.contains(&tag.start())) {
                continue;
            }

            let self_closing = tag.as_str().ends_with("/>");
            let attributes = match captures.get(1) {
                Some(region) => attribute
                    .captures_iter(region.as_str())
                    .filter_map(|attr| {
                        let attr_name = attr.get(1)?;
                        let value = attr.get(2).or_else(|| attr.get(3))?;
                        Some(Attribute {
                            name: attr_name.as_str().to_string(),
                            value: region.start() + value.start()..region.start() + value.end(),
                        })
                    })
                    .collect(),
                None => Vec::new(),
            };

            let content = if self_closing {
                None
            } else {
                end_tag
                    .captures(&self.text[tag.end()..])
                    .and_then(|c| c.get(1))
                    .map(|text| tag.end() + text.start()..tag.end() + text.end())
            };

            elements.push(Element {
                name: name.to_string(),
                ordinal: elements.len(),
                tag: tag.range(),
                self_closing,
                content,
                attributes,
            });
        }

        Ok(elements)
    }

    /// The first element named `name` anywhere in the document.
    pub fn first(&self, name: &str) -> Result<Element> {
        self.elements(name)?
            .into_iter()
            .next()
            .ok_or_else(|| BumpError::missing_field(name))
    }

    /// Unescaped text content; empty for `<Name/>`.
    pub fn text(&self, element: &Element) -> String {
        element
            .content
            .as_ref()
            .map(|range| unescape(&self.text[range.clone()]))
            .unwrap_or_default()
    }

    pub fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element
            .attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| unescape(&self.text[attr.value.clone()]))
    }

    /// Replaces the text content of `element`.
    pub fn set_text(&mut self, element: &Element, value: &str) -> Result<()> {
        let current = self.relocate(element)?;
        let escaped = escape(value);
        match current.content {
            Some(range) => self.text.replace_range(range, &escaped),
            None if !current.self_closing => {
                return Err(BumpError::NotText {
                    element: current.name,
                });
            }
            None => {
                let open = self.text[current.tag.clone()]
                    .trim_end_matches('>')
                    .trim_end_matches('/')
                    .trim_end()
                    .to_string();
                let replacement = format!("{open}>{escaped}</{}>", current.name);
                self.text.replace_range(current.tag, &replacement);
            }
        }
        Ok(())
    }

    /// Replaces the value of an existing attribute of `element`.
    pub fn set_attribute(&mut self, element: &Element, name: &str, value: &str) -> Result<()> {
        let current = self.relocate(element)?;
        let attribute = current
            .attributes
            .iter()
            .find(|attr| attr.name == name)
            .ok_or_else(|| BumpError::missing_field(format!("{} {}", current.name, name)))?;
        self.text.replace_range(attribute.value.clone(), &escape(value));
        Ok(())
    }

    fn relocate(&self, element: &Element) -> Result<Element> {
        self.elements(&element.name)?
            .into_iter()
            .nth(element.ordinal)
            .ok_or_else(|| BumpError::missing_field(element.name.clone()))
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn attribute_regex() -> Result<Regex> {
    Ok(Regex::new(r#"([A-Za-z_][\w.:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?)
}

fn comment_spans(text: &str) -> Result<Vec<Range<usize>>> {
    let comment = Regex::new(r"(?s)<!--.*?-->")?;
    Ok(comment.find_iter(text).map(|m| m.range()).collect())
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
