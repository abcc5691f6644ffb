//! Lexer for the interface definition format. The lexer classifies
//! physical lines into tokens (tokens are the input to the parser).
//!
//! Blank lines produce no token. The lexer never fails: lines that are
//! not keywords or comments are value candidates and the parser decides
//! whether a value is valid at that position.

use ifagen_dsl::core::{FileId, SourceSpan};

use crate::token::{Token, TokenKind, KEYWORDS};

/// Tokenize an interface definition document.
pub fn tokenize(source: &str, file_id: &FileId) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    for (line_number, line) in source.split('\n').enumerate() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            let start = offset + (line.len() - line.trim_start().len());
            let span = SourceSpan::range(start, start + trimmed.len()).with_file_id(file_id);

            let token = if let Some(comment) = trimmed.strip_prefix("//") {
                Token {
                    kind: TokenKind::Comment,
                    text: comment.trim().to_string(),
                    span,
                    line: line_number,
                }
            } else if let Some(keyword) = KEYWORDS.get(trimmed) {
                Token {
                    kind: TokenKind::Keyword(*keyword),
                    text: trimmed.to_string(),
                    span,
                    line: line_number,
                }
            } else {
                Token {
                    kind: TokenKind::Value,
                    text: trimmed.to_string(),
                    span,
                    line: line_number,
                }
            };
            tokens.push(token);
        }

        offset += line.len() + 1;
    }

    tokens
}
