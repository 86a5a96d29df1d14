use serde::Serialize;
use std::fmt;

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub name: String,
    pub count: usize,
}

/// A captured element: where it sits, its attributes in document order and
/// its (possibly truncated) direct text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleNode {
    pub path: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

/// Bounded structural digest of an XML document.
///
/// Holds only owned strings, so it outlives the parsed tree it was built from.
/// The `Display` impl renders the text block that gets embedded in prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub root: String,
    pub top_tags: Vec<FrequencyEntry>,
    pub top_paths: Vec<FrequencyEntry>,
    pub samples: Vec<SampleNode>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "ROOT: <{}>", self.root)?;

        writeln!(f, "\nTOP TAGS (tag: count):")?;
        for entry in &self.top_tags {
            writeln!(f, "- {}: {}", entry.name, entry.count)?;
        }

        writeln!(f, "\nTOP PATHS (path: count):")?;
        for entry in &self.top_paths {
            writeln!(f, "- {}: {}", entry.name, entry.count)?;
        }

        write!(f, "\nSAMPLES:")?;
        for sample in &self.samples {
            write!(f, "\n- path: {}", sample.path)?;
            if !sample.attributes.is_empty() {
                write!(f, "\n  attributes: {}", render_attributes(&sample.attributes))?;
            }
            if !sample.text.is_empty() {
                write!(f, "\n  text: {}", sample.text)?;
            }
        }
        Ok(())
    }
}

fn render_attributes(attributes: &[(String, String)]) -> String {
    let pairs: Vec<String> = attributes
        .iter()
        .map(|(name, value)| format!("{}={:?}", name, value))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, count: usize) -> FrequencyEntry {
        FrequencyEntry {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn renders_sections_in_fixed_order() {
        let summary = Summary {
            root: "catalog".to_string(),
            top_tags: vec![entry("book", 2), entry("catalog", 1)],
            top_paths: vec![entry("/catalog/book", 2), entry("/catalog", 1)],
            samples: vec![
                SampleNode {
                    path: "/catalog".to_string(),
                    attributes: vec![],
                    text: String::new(),
                },
                SampleNode {
                    path: "/catalog/book".to_string(),
                    attributes: vec![
                        ("id".to_string(), "bk101".to_string()),
                        ("lang".to_string(), "en".to_string()),
                    ],
                    text: "XML Developer's Guide".to_string(),
                },
            ],
        };

        let expected = "ROOT: <catalog>\n\
\n\
TOP TAGS (tag: count):\n\
- book: 2\n\
- catalog: 1\n\
\n\
TOP PATHS (path: count):\n\
- /catalog/book: 2\n\
- /catalog: 1\n\
\n\
SAMPLES:\n\
- path: /catalog\n\
- path: /catalog/book\n  attributes: {id=\"bk101\", lang=\"en\"}\n  text: XML Developer's Guide";

        assert_eq!(summary.to_string(), expected);
    }

    #[test]
    fn attribute_values_are_quoted_and_escaped() {
        let rendered = render_attributes(&[("title".to_string(), "say \"hi\"".to_string())]);
        assert_eq!(rendered, r#"{title="say \"hi\""}"#);
    }
}
