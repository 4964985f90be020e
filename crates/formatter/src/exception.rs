//! Exception rendering and fingerprinting

use contracts::CapturedError;
use serde::Serialize;

/// Upper bound on hash segments; deeper traces are folded from the tail
const MAX_HASH_SEGMENTS: usize = 10;

/// Hex characters kept from each per-line digest
const SEGMENT_LEN: usize = 8;

/// Serialized `exception_info` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionInfo {
    /// Unqualified type name
    pub exception_type: String,
    pub error_message: String,
    /// Full rendered trace, including the cause chain
    pub stack_trace: String,
    /// Call-site fingerprint, see [`hash_exception`]
    pub exception_hash: String,
}

impl ExceptionInfo {
    pub fn from_captured(error: &CapturedError) -> Self {
        let mut stack_trace = render_trace(error);
        for cause in error.causes() {
            stack_trace.push_str("\n  caused by: ");
            stack_trace.push_str(cause);
        }

        Self {
            exception_type: error.type_name().to_string(),
            error_message: error.message().to_string(),
            stack_trace,
            exception_hash: hash_exception(error),
        }
    }
}

/// Render frames one per line, then a blank line, then `  <type> <message>`.
pub fn render_trace(error: &CapturedError) -> String {
    let mut rendered = error
        .frames()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    rendered.push_str("\n\n");
    rendered.push_str(&format!("  {} {}", error.type_name(), error.message()));
    rendered
}

/// Hierarchical fingerprint of an exception's call site.
///
/// 1. render the trace (see [`render_trace`])
/// 2. drop the final two lines (blank separator and `<type> <message>`)
/// 3. strip everything from the first `(` of the new last line
/// 4. fold the last two lines together while more than 10 remain
/// 5. md5 each line, keep 8 hex chars, join with `.`
///
/// Two failures raised at the same site with different messages hash
/// identically; the same site reached through a different frame does not.
pub fn hash_exception(error: &CapturedError) -> String {
    let rendered = render_trace(error);
    let mut lines: Vec<String> = rendered.split('\n').map(str::to_string).collect();

    let keep = lines.len().saturating_sub(2);
    lines.truncate(keep);

    if let Some(last) = lines.last_mut() {
        if let Some(idx) = last.find('(') {
            last.truncate(idx);
        }
    }

    while lines.len() > MAX_HASH_SEGMENTS {
        if let Some(tail) = lines.pop() {
            if let Some(last) = lines.last_mut() {
                last.push_str(&tail);
            }
        }
    }

    lines
        .iter()
        .map(|line| {
            let digest = format!("{:x}", md5::compute(line.as_bytes()));
            digest[..SEGMENT_LEN].to_string()
        })
        .collect::<Vec<_>>()
        .join(".")
}
