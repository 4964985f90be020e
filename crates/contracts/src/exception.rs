//! CapturedError - failure information attached to an event

use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

/// A single frame of a captured stack trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    function: String,
    location: Option<String>,
}

impl StackFrame {
    /// Create a frame with a source location (`file:line`)
    pub fn new(function: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            location: Some(location.into()),
        }
    }

    /// Create a frame without location information
    pub fn function_only(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            location: None,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "  at {} ({})", self.function, location),
            None => write!(f, "  at {}", self.function),
        }
    }
}

/// An error captured together with its stack trace.
///
/// Frames are ordered outermost first, the frame that raised the failure last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    type_name: String,
    message: String,
    frames: Vec<StackFrame>,
    causes: Vec<String>,
}

impl CapturedError {
    pub fn new(
        type_name: impl Into<String>,
        message: impl Into<String>,
        frames: Vec<StackFrame>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            frames,
            causes: Vec::new(),
        }
    }

    /// Capture an error value at the current call site.
    ///
    /// The type name is unqualified, the message is the error's `Display`
    /// output, and the source chain is kept as `causes`.
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        let backtrace = Backtrace::force_capture();
        let frames = parse_backtrace(&backtrace.to_string());

        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            type_name: unqualified_type_name::<E>(),
            message: error.to_string(),
            frames,
            causes,
        }
    }

    pub fn with_causes(mut self, causes: Vec<String>) -> Self {
        self.causes = causes;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

/// `std::num::ParseIntError` -> `ParseIntError`, generics stripped
fn unqualified_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}

/// Parse the `Display` output of a `std::backtrace::Backtrace`.
///
/// Frame lines look like `  12: crate::module::function`, optionally
/// followed by `at src/file.rs:10:5`. Frames of the capture machinery itself
/// are skipped. The innermost frame is printed first, so the result is
/// reversed to keep the outermost-first order.
fn parse_backtrace(rendered: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();
        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                if last.location.is_none() {
                    last.location = Some(location.to_string());
                }
            }
            continue;
        }

        let Some((index, function)) = trimmed.split_once(": ") else {
            continue;
        };
        if index.chars().all(|c| c.is_ascii_digit()) {
            frames.push(StackFrame::function_only(function));
        }
    }

    frames.retain(|frame| {
        !frame.function.starts_with("std::backtrace")
            && !frame.function.contains("CapturedError::from_error")
    });
    frames.reverse();
    frames
}
