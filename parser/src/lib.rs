//! Parser for PLC device interface definitions.
//!
//! Converts the line-oriented text format into the validated document
//! model from `ifagen-dsl`.

extern crate ifagen_dsl as dsl;

mod lexer;
mod parser;

pub mod token;


use dsl::common::IfaDocument;
use dsl::core::FileId;
use dsl::diagnostic::Diagnostic;

use crate::lexer::tokenize;
use crate::token::Token;

/// Tokenize an interface definition document.
///
/// Classifies every non-blank physical line. This never fails: lines that
/// do not match the keyword table are value candidates for the parser.
pub fn tokenize_document(source: &str, file_id: &FileId) -> Vec<Token> {
    tokenize(source, file_id)
}

/// Parse a full interface definition document.
pub fn parse_document(source: &str, file_id: &FileId) -> Result<IfaDocument, Diagnostic> {
    let tokens = tokenize_document(source, file_id);
    parser::parse(&tokens, file_id)
}
