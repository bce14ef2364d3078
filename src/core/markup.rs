//! Snippet-markup filter.
//!
//! Source files may carry state and remove blocks:
//!
//! ```text
//! :state-start: draft
//! This line only survives when publishing the "draft" state.
//! :state-end:
//! :remove-start:
//! This line never survives.
//! :remove-end:
//! ```
//!
//! Marker lines themselves are never emitted. Content inside a state block
//! is kept only when the block's name matches the requested state; with no
//! state requested, all state-block content is dropped. Remove blocks are
//! always dropped. Blocks do not nest.

const STATE_START: &str = ":state-start:";
const STATE_END: &str = ":state-end:";
const REMOVE_START: &str = ":remove-start:";
const REMOVE_END: &str = ":remove-end:";

/// A malformed marker, positioned by 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupError {
    pub line: usize,
    pub message: String,
}

impl MarkupError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

enum Region {
    Text,
    State { name: String, opened_at: usize },
    Remove { opened_at: usize },
}

/// Run the filter over a whole file, selecting `state` content.
///
/// Returns the processed text, or the first malformed marker encountered.
pub fn process(source: &str, state: Option<&str>) -> Result<String, MarkupError> {
    let mut region = Region::Text;
    let mut kept: Vec<&str> = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let lineno = idx + 1;

        if line.contains(STATE_START) {
            if !matches!(region, Region::Text) {
                return Err(MarkupError::new(lineno, "markers do not nest"));
            }
            let name = marker_argument(line, STATE_START).ok_or_else(|| {
                MarkupError::new(lineno, format!("{STATE_START} requires a state name"))
            })?;
            region = Region::State {
                name,
                opened_at: lineno,
            };
        } else if line.contains(STATE_END) {
            if !matches!(region, Region::State { .. }) {
                return Err(MarkupError::new(
                    lineno,
                    format!("{STATE_END} without a matching {STATE_START}"),
                ));
            }
            region = Region::Text;
        } else if line.contains(REMOVE_START) {
            if !matches!(region, Region::Text) {
                return Err(MarkupError::new(lineno, "markers do not nest"));
            }
            region = Region::Remove { opened_at: lineno };
        } else if line.contains(REMOVE_END) {
            if !matches!(region, Region::Remove { .. }) {
                return Err(MarkupError::new(
                    lineno,
                    format!("{REMOVE_END} without a matching {REMOVE_START}"),
                ));
            }
            region = Region::Text;
        } else {
            match &region {
                Region::Text => kept.push(line),
                Region::State { name, .. } => {
                    if state == Some(name.as_str()) {
                        kept.push(line);
                    }
                }
                Region::Remove { .. } => {}
            }
        }
    }

    match region {
        Region::Text => {}
        Region::State { opened_at, .. } => {
            return Err(MarkupError::new(
                opened_at,
                format!("unclosed {STATE_START} block"),
            ));
        }
        Region::Remove { opened_at } => {
            return Err(MarkupError::new(
                opened_at,
                format!("unclosed {REMOVE_START} block"),
            ));
        }
    }

    let mut out = kept.join("\n");
    if source.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

/// Extract the first word after a marker tag.
///
/// Tolerates comment wrappers around the marker line, e.g.
/// `<!-- :state-start: final -->` yields `final`.
fn marker_argument(line: &str, tag: &str) -> Option<String> {
    let rest = &line[line.find(tag)? + tag.len()..];
    rest.split_whitespace().next().map(str::to_string)
}
