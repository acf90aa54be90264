//! Support for reading s-expressions from strings.

use crate::data::{Symbols, Value};

mod parse;
mod token;

/// Read a single form from the input.
///
/// Reader shorthand such as `'x` is expanded into its canonical list form
/// (`(quote x)`), so the caller only ever sees atoms, lists, vectors, and
/// maps. Symbols and keywords are interned through `symbols`. Tokens after
/// the first complete form are ignored.
pub fn read(symbols: &mut Symbols, input: &str) -> ReadResult<Value> {
    let tokens = token::tokenize(input)?;
    if tokens.is_empty() {
        return Err(ReadErr::Blank);
    }
    tracing::trace!("tokenized input into {} tokens", tokens.len());

    let mut cursor = parse::Cursor::new(tokens);
    parse::read_form(&mut cursor, symbols)
}

/// Error type if a read does not complete.
///
/// A reader may hit a true parse error, e.g. "())", that no additional
/// input can fix. This is distinct from a reader that runs out of input
/// partway through a form, e.g. "((": it may be that more input will fix
/// the issue.
///
/// If input is coming in interactively, this is a useful distinction;
/// in the first case we'd want to indicate an error to the user,
/// while in the latter we'd like to prompt the user for more input.
/// [`ReadErr::is_incomplete`] makes that distinction. `Blank` is its own
/// signal, "nothing here at all", and is matched explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadErr {
    /// The input held no forms: empty, or whitespace and comments only.
    Blank,
    /// A closing delimiter where a form was expected.
    UnexpectedClose(char),
    /// Input ran out before the form's closing delimiter.
    UnbalancedForm { expected: char },
    /// A reader shorthand with nothing after it to attach to.
    MissingForm,
    /// A string literal with no closing quote.
    UnterminatedString,
    /// An opening delimiter closed by the wrong partner, e.g. "(1 2]".
    MismatchedClose { open: char, close: char },
    /// A numeric-shaped token outside the representable range.
    BadNumber(String),
    /// A reader bug, not an input error.
    Internal(String),
}

impl ReadErr {
    /// True if more input could complete the form; an interactive caller
    /// may prompt for another line rather than report an error.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            ReadErr::UnbalancedForm { .. } | ReadErr::MissingForm | ReadErr::UnterminatedString
        )
    }
}

impl std::fmt::Display for ReadErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadErr::Blank => write!(f, "no forms in input"),
            ReadErr::UnexpectedClose(close) => write!(f, "unexpected '{close}'"),
            ReadErr::UnbalancedForm { expected } => {
                write!(f, "expected '{expected}', got end-of-input")
            }
            ReadErr::MissingForm => write!(f, "expected a form, got end-of-input"),
            ReadErr::UnterminatedString => {
                write!(f, "expected closing quote, got end-of-input")
            }
            ReadErr::MismatchedClose { open, close } => {
                write!(f, "form opened with '{open}' but closed with '{close}'")
            }
            ReadErr::BadNumber(token) => write!(f, "number out of range: {token}"),
            ReadErr::Internal(msg) => write!(f, "internal reader error: {msg}"),
        }
    }
}

impl std::error::Error for ReadErr {}

/// The main result type for this module: a T, or a read error.
pub type ReadResult<T> = Result<T, ReadErr>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_inputs() {
        let mut symbols = Symbols::new();
        for input in ["", "   ", "\n\t ", ",,,", ";; comment only", "; one\n; two"] {
            assert_eq!(
                read(&mut symbols, input),
                Err(ReadErr::Blank),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn incomplete_errors_invite_more_input() {
        let mut symbols = Symbols::new();
        for input in ["(1 2", "[", "{:a", "'", "\"hello"] {
            let err = read(&mut symbols, input).unwrap_err();
            assert!(err.is_incomplete(), "input {:?} gave {:?}", input, err);
        }
        for input in [")", "(1 2]", ""] {
            let err = read(&mut symbols, input).unwrap_err();
            assert!(!err.is_incomplete(), "input {:?} gave {:?}", input, err);
        }
    }
}
