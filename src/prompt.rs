use crate::error::XmlAnalystError;
use std::fmt;
use std::str::FromStr;

/// File format the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Xml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
        }
    }

    pub fn filename(&self) -> String {
        format!("result.{}", self.extension())
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "text/csv",
            OutputFormat::Xml => "application/xml",
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename())
    }

    fn constraints(&self) -> &'static [&'static str] {
        match self {
            OutputFormat::Csv => &[
                "Respond with CSV only.",
                "The first row must be a header row naming every column.",
                "Enclose any field containing a comma, double quote or line break in double quotes, and escape a double quote inside a field by doubling it (\"\").",
            ],
            OutputFormat::Xml => &[
                "Respond with XML only.",
                "Wrap all output in a single root element so the response is one well-formed XML document.",
            ],
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = XmlAnalystError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(XmlAnalystError::InvalidRequest(
                "output_format must be csv or xml".to_string(),
            )),
        }
    }
}

const TASK_FRAMING: &str = "You are a data extraction assistant. Below is a structural summary of an XML document (root element, most frequent tags and paths, and sample nodes), followed by an instruction from the user. Follow the instruction using the structure described in the summary.";

/// Builds the single prompt string sent to whichever backend was selected.
pub fn compose_prompt(instruction: &str, summary: &str, format: OutputFormat) -> String {
    let mut prompt = String::new();
    prompt.push_str(TASK_FRAMING);

    prompt.push_str("\n\nUSER INSTRUCTION:\n");
    prompt.push_str(instruction.trim());

    prompt.push_str("\n\nXML SUMMARY:\n");
    prompt.push_str(summary);

    prompt.push_str("\n\nOUTPUT REQUIREMENTS:\n");
    for rule in format.constraints() {
        prompt.push_str(&format!("- {}\n", rule));
    }
    prompt.push_str("- Do not wrap the output in markdown code fences.\n");
    prompt.push_str("- Do not include explanations, notes or any text before or after the data.");
    prompt
}
