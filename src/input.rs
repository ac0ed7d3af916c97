//! Process descriptor input.
//!
//! One process per line, six integer fields:
//!
//! ```text
//! pid, memory, arrival, cpu_time, io_frequency, io_duration
//! ```
//!
//! Fields are separated by commas or, when a line has no comma, by
//! whitespace. Blank lines are ignored. Malformed lines are dropped with a
//! diagnostic and parsing continues; fields past the sixth are ignored.

use log::warn;
use std::fmt;

use crate::models::ProcessDescriptor;

const FIELD_NAMES: [&str; 6] = [
    "pid",
    "memory",
    "arrival time",
    "cpu time",
    "io frequency",
    "io duration",
];

/// A dropped input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line number.
    pub line: usize,
    /// The offending line, trimmed.
    pub content: String,
    pub message: String,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line, self.message, self.content)
    }
}

/// Parsed descriptors plus diagnostics for skipped lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedInput {
    pub descriptors: Vec<ProcessDescriptor>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedInput {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses descriptor text.
///
/// # Example
/// ```
/// use u_procsim::input::parse_descriptors;
///
/// let parsed = parse_descriptors("1, 10, 0, 50, 5, 2\n2, 4, 3\n");
/// assert_eq!(parsed.descriptors.len(), 1);
/// assert_eq!(parsed.diagnostics[0].line, 2);
/// ```
pub fn parse_descriptors(text: &str) -> ParsedInput {
    let mut parsed = ParsedInput::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(desc) => parsed.descriptors.push(desc),
            Err(message) => {
                let diagnostic = ParseDiagnostic {
                    line: index + 1,
                    content: line.to_string(),
                    message,
                };
                warn!("skipping malformed process record: {diagnostic}");
                parsed.diagnostics.push(diagnostic);
            }
        }
    }

    parsed
}

fn parse_line(line: &str) -> Result<ProcessDescriptor, String> {
    let fields: Vec<&str> = if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    };

    if fields.len() < FIELD_NAMES.len() {
        return Err(format!(
            "expected {} fields, found {}",
            FIELD_NAMES.len(),
            fields.len()
        ));
    }

    let mut values = [0u64; 6];
    for (slot, (field, name)) in values.iter_mut().zip(fields.iter().zip(FIELD_NAMES)) {
        *slot = field
            .parse()
            .map_err(|_| format!("invalid {name} '{field}'"))?;
    }

    let [pid, memory, arrival, cpu, io_frequency, io_duration] = values;
    let pid = u32::try_from(pid).map_err(|_| format!("pid {pid} out of range"))?;

    Ok(ProcessDescriptor::new(pid, memory, arrival, cpu).with_io(io_frequency, io_duration))
}
