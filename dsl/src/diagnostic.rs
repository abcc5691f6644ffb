//! Provides definitions for diagnostics, which are normally errors and
//! warnings associated with turning an interface definition into code.
//!
//! There exist crates that make this easy, but the diagnostics here need
//! to serve both command line reporting and machine-readable output, and
//! no one crate covers both well.

use ifagen_problems::Problem;

use crate::core::SourceSpan;

/// A label that refers to some range in a file and possibly associated
/// with a message related to that range.
///
/// Normally this indicates the location of an error or warning along with
/// a text message describing that position.
#[derive(Debug)]
pub struct Label {
    /// The position of the label.
    pub span: SourceSpan,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn span(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    /// A "position" that names a file in its entirety rather than a
    /// particular location.
    pub fn file(message: impl Into<String>) -> Self {
        Self {
            span: SourceSpan::default(),
            message: message.into(),
        }
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category,
/// a primary location and a possibly non-empty set of secondary locations.
#[derive(Debug)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary or first label.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified
    /// label.
    ///
    /// The label associates the problem to a particular instance in an
    /// interface definition file.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    ///
    /// This is similar to adding primary and secondary items except that
    /// this forms part of the main description and does not need to be
    /// related to a position in a source file.
    pub fn with_context(mut self, description: &str, item: &str) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}
