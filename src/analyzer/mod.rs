mod frequency;
mod paths;

pub use frequency::FrequencyTable;
pub use paths::{PathTrie, TagInterner};

use crate::error::XmlAnalystError;
use crate::summary::{FrequencyEntry, SampleNode, Summary};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

pub const MAX_SAMPLE_TEXT_CHARS: usize = 120;
pub const TRUNCATION_MARKER: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub max_sample_nodes: usize,
    pub top_n: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            max_sample_nodes: 8,
            top_n: 20,
        }
    }
}

/// Summarizes raw XML bytes. The bytes must be UTF-8.
pub fn summarize(xml_bytes: &[u8], options: SummaryOptions) -> Result<Summary, XmlAnalystError> {
    let text = std::str::from_utf8(xml_bytes).map_err(|e| {
        XmlAnalystError::ParseError(format!("File is not valid UTF-8 text: {}", e))
    })?;
    summarize_str(text, options)
}

/// Pull-parses the document and walks its elements in pre-order.
///
/// Open elements live on an explicit stack, so nesting depth is bounded by
/// memory rather than by the call stack. The whole document is checked for
/// well-formedness before a summary is returned.
pub fn summarize_str(xml: &str, options: SummaryOptions) -> Result<Summary, XmlAnalystError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = true;

    let mut walk = Walk::new(options.max_sample_nodes);
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(malformed(e, reader.buffer_position())),
        };
        let step = match event {
            Event::Start(element) => walk.open(&element),
            Event::Empty(element) => walk.open(&element).and_then(|()| walk.close()),
            Event::End(_) => walk.close(),
            Event::Text(text) => text
                .unescape()
                .map_err(|e| e.to_string())
                .and_then(|text| walk.text(&text)),
            Event::CData(data) => std::str::from_utf8(&data)
                .map_err(|e| e.to_string())
                .and_then(|text| walk.text(text)),
            Event::Comment(_) | Event::PI(_) => {
                walk.end_text();
                Ok(())
            }
            Event::Decl(_) | Event::DocType(_) => Ok(()),
            Event::Eof => break,
        };
        step.map_err(|msg| malformed(msg, reader.buffer_position()))?;
    }

    walk.finish(options.top_n)
        .map_err(|msg| malformed(msg, reader.buffer_position()))
}

pub fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(MAX_SAMPLE_TEXT_CHARS) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_string();
            truncated.push(TRUNCATION_MARKER);
            truncated
        }
        None => text.to_string(),
    }
}

fn malformed(err: impl fmt::Display, position: impl fmt::Display) -> XmlAnalystError {
    XmlAnalystError::ParseError(format!("{} at position {}", err, position))
}

struct OpenElement {
    path: usize,
    /// Sample still collecting the element's leading text.
    text_sample: Option<usize>,
}

struct Walk {
    tags: TagInterner,
    paths: PathTrie,
    tag_counts: FrequencyTable,
    path_counts: FrequencyTable,
    samples: Vec<SampleNode>,
    max_samples: usize,
    open: Vec<OpenElement>,
    root: Option<usize>,
    root_closed: bool,
}

impl Walk {
    fn new(max_samples: usize) -> Self {
        Walk {
            tags: TagInterner::default(),
            paths: PathTrie::default(),
            tag_counts: FrequencyTable::new(),
            path_counts: FrequencyTable::new(),
            samples: Vec::new(),
            max_samples,
            open: Vec::new(),
            root: None,
            root_closed: false,
        }
    }

    fn open(&mut self, element: &BytesStart) -> Result<(), String> {
        if self.root_closed {
            return Err("document has more than one root element".to_string());
        }
        self.end_text();

        let tag = self.tags.intern(decode_name(element.name().as_ref())?);
        let parent = self.open.last().map(|open| open.path);
        let path = self.paths.child(parent, tag);
        self.tag_counts.record(tag);
        self.path_counts.record(path);
        self.root.get_or_insert(tag);

        let sampled = self.samples.len() < self.max_samples;
        let attributes = read_attributes(element, sampled)?;
        let text_sample = if sampled {
            self.samples.push(SampleNode {
                path: self.paths.render(path, &self.tags),
                attributes,
                text: String::new(),
            });
            Some(self.samples.len() - 1)
        } else {
            None
        };

        self.open.push(OpenElement { path, text_sample });
        Ok(())
    }

    fn close(&mut self) -> Result<(), String> {
        self.end_text();
        self.open
            .pop()
            .ok_or("closing tag without a matching opening tag")?;
        if self.open.is_empty() {
            self.root_closed = true;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), String> {
        match self.open.last() {
            Some(open) => {
                if let Some(index) = open.text_sample {
                    self.samples[index].text.push_str(text);
                }
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err("text outside the root element".to_string()),
        }
    }

    /// Direct text ends at the first child, comment or processing instruction.
    fn end_text(&mut self) {
        if let Some(index) = self.open.last_mut().and_then(|open| open.text_sample.take()) {
            let sample = &mut self.samples[index];
            sample.text = truncate_text(sample.text.trim());
        }
    }

    fn finish(self, top_n: usize) -> Result<Summary, String> {
        if !self.open.is_empty() {
            return Err(format!("{} element(s) were not closed", self.open.len()));
        }
        let root = self.root.ok_or("document has no root element")?;

        debug!(
            "Summarized XML: {} distinct tags, {} distinct paths, {} samples",
            self.tag_counts.len(),
            self.paths.len(),
            self.samples.len()
        );

        let top_tags = self
            .tag_counts
            .top(top_n)
            .into_iter()
            .map(|(id, count)| FrequencyEntry {
                name: self.tags.name(id).to_string(),
                count,
            })
            .collect();
        let top_paths = self
            .path_counts
            .top(top_n)
            .into_iter()
            .map(|(id, count)| FrequencyEntry {
                name: self.paths.render(id, &self.tags),
                count,
            })
            .collect();

        Ok(Summary {
            root: self.tags.name(root).to_string(),
            top_tags,
            top_paths,
            samples: self.samples,
        })
    }
}

fn decode_name(raw: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(raw).map_err(|e| e.to_string())
}

/// Attributes are always decoded so a bad one fails the document, but only
/// kept for sampled elements. Namespace declarations are not attributes here.
fn read_attributes(element: &BytesStart, keep: bool) -> Result<Vec<(String, String)>, String> {
    let mut attributes = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let name = decode_name(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        if keep && name != "xmlns" && !name.starts_with("xmlns:") {
            attributes.push((name.to_string(), value.into_owned()));
        }
    }
    Ok(attributes)
}
