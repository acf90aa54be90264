//! Recursive descent over the token sequence.

use crate::data::{Float, Integer, Symbols, Value};
use crate::reader::{ReadErr, ReadResult};

/// Read position over the token sequence.
///
/// One cursor per parse; every recursive call shares it by `&mut`
/// parameter, and the position only ever moves forward.
pub(super) struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(tokens: Vec<&'a str>) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// The current token, without consuming it.
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    /// Consume and return the current token.
    fn advance(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
}

/// Shorthand markers the reader expands into canonical list forms.
#[derive(Debug, Clone, Copy)]
enum Shorthand {
    Quote,
    Quasiquote,
    Unquote,
    SpliceUnquote,
    Deref,
    WithMeta,
}

impl Shorthand {
    /// Name of the symbol heading the expansion.
    fn name(self) -> &'static str {
        match self {
            Shorthand::Quote => "quote",
            Shorthand::Quasiquote => "quasiquote",
            Shorthand::Unquote => "unquote",
            Shorthand::SpliceUnquote => "splice-unquote",
            Shorthand::Deref => "deref",
            Shorthand::WithMeta => "with-meta",
        }
    }
}

/// A delimiter pair and the container it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Paren,
    Bracket,
    Brace,
}

impl Delim {
    fn open(self) -> char {
        match self {
            Delim::Paren => '(',
            Delim::Bracket => '[',
            Delim::Brace => '{',
        }
    }

    fn close(self) -> char {
        match self {
            Delim::Paren => ')',
            Delim::Bracket => ']',
            Delim::Brace => '}',
        }
    }

    /// Wrap the collected items in this delimiter's container variant.
    fn collect(self, items: Vec<Value>) -> Value {
        match self {
            Delim::Paren => Value::List(items),
            Delim::Bracket => Value::Vector(items),
            Delim::Brace => Value::Map(items),
        }
    }
}

/// The leading-token classes `read_form` dispatches over.
enum Lead<'a> {
    Shorthand(Shorthand),
    Open(Delim),
    Close(Delim),
    Atom(&'a str),
}

fn classify(token: &str) -> Lead<'_> {
    match token {
        "'" => Lead::Shorthand(Shorthand::Quote),
        "`" => Lead::Shorthand(Shorthand::Quasiquote),
        "~" => Lead::Shorthand(Shorthand::Unquote),
        "~@" => Lead::Shorthand(Shorthand::SpliceUnquote),
        "@" => Lead::Shorthand(Shorthand::Deref),
        "^" => Lead::Shorthand(Shorthand::WithMeta),
        "(" => Lead::Open(Delim::Paren),
        "[" => Lead::Open(Delim::Bracket),
        "{" => Lead::Open(Delim::Brace),
        ")" => Lead::Close(Delim::Paren),
        "]" => Lead::Close(Delim::Bracket),
        "}" => Lead::Close(Delim::Brace),
        atom => Lead::Atom(atom),
    }
}

/// Read one complete form from the cursor.
///
/// Dispatch is over the leading token: shorthand expands and recurses, an
/// opening delimiter hands off to the sequence reader, a closing delimiter
/// is an error here, and anything else is an atom.
pub(super) fn read_form(cursor: &mut Cursor<'_>, symbols: &mut Symbols) -> ReadResult<Value> {
    let token = cursor.peek().ok_or(ReadErr::MissingForm)?;
    match classify(token) {
        Lead::Shorthand(shorthand) => {
            cursor.advance();
            read_shorthand(cursor, symbols, shorthand)
        }
        Lead::Open(delim) => {
            let items = read_seq(cursor, symbols, delim)?;
            Ok(delim.collect(items))
        }
        Lead::Close(delim) => Err(ReadErr::UnexpectedClose(delim.close())),
        Lead::Atom(token) => {
            cursor.advance();
            read_atom(token, symbols)
        }
    }
}

/// Expand a shorthand marker into its canonical list form.
///
/// `^` reads its metadata form before its target in source order, but the
/// emitted list carries the target first.
fn read_shorthand(
    cursor: &mut Cursor<'_>,
    symbols: &mut Symbols,
    shorthand: Shorthand,
) -> ReadResult<Value> {
    let head = symbols.symbol(shorthand.name());
    let items = match shorthand {
        Shorthand::WithMeta => {
            let meta = read_form(cursor, symbols)?;
            let target = read_form(cursor, symbols)?;
            vec![head, target, meta]
        }
        _ => vec![head, read_form(cursor, symbols)?],
    };
    Ok(Value::List(items))
}

/// Read the body of a delimited sequence, consuming both delimiters.
///
/// A closing delimiter from a different pair is rejected; "(1 2]" never
/// reads as a well-formed list.
fn read_seq(
    cursor: &mut Cursor<'_>,
    symbols: &mut Symbols,
    delim: Delim,
) -> ReadResult<Vec<Value>> {
    match cursor.advance() {
        Some(t) if matches!(classify(t), Lead::Open(d) if d == delim) => {}
        other => {
            return Err(ReadErr::Internal(format!(
                "expected '{}', got {:?}",
                delim.open(),
                other
            )))
        }
    }

    let mut items = Vec::new();
    loop {
        let token = cursor.peek().ok_or(ReadErr::UnbalancedForm {
            expected: delim.close(),
        })?;
        match classify(token) {
            Lead::Close(d) if d == delim => {
                cursor.advance();
                return Ok(items);
            }
            Lead::Close(d) => {
                return Err(ReadErr::MismatchedClose {
                    open: delim.open(),
                    close: d.close(),
                })
            }
            _ => items.push(read_form(cursor, symbols)?),
        }
    }
}

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn integer() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH
            .get_or_init(|| Regex::new(r#"\A-?[0-9]+\z"#).expect("could not compile regex for integer"))
    }

    pub(super) fn float() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r#"\A-?[0-9]+[.][0-9]*\z"#).expect("could not compile regex for float")
        })
    }
}

/// Decode a single non-container token.
///
/// Classification runs in a fixed order: integer, then float, then string,
/// then keyword, then the reserved words, then symbol. The numeric
/// patterns must cover the whole token, so a near-miss like "1.2.3" is a
/// symbol, not a number and not a string.
fn read_atom(token: &str, symbols: &mut Symbols) -> ReadResult<Value> {
    if regex::integer().is_match(token) {
        let n: Integer = token
            .parse()
            .map_err(|_| ReadErr::BadNumber(token.to_owned()))?;
        return Ok(Value::Integer(n));
    }
    if regex::float().is_match(token) {
        let x: Float = token
            .parse()
            .map_err(|_| ReadErr::BadNumber(token.to_owned()))?;
        return Ok(Value::Float(x));
    }
    if let Some(body) = token.strip_prefix('"') {
        return unescape(body).map(Value::String);
    }
    if let Some(name) = token.strip_prefix(':') {
        return Ok(symbols.keyword(name));
    }
    match token {
        "nil" => Ok(Value::Nil),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Ok(symbols.symbol(token)),
    }
}

/// Resolve the escapes in a string token, minus its opening quote.
///
/// `\n` becomes a newline; any other escaped character stands for itself.
/// The tokenizer only ever leaves an unescaped quote at the end of the
/// token, so seeing one means the string closed.
fn unescape(body: &str) -> ReadResult<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    loop {
        match chars.next() {
            Some('"') => return Ok(out),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some(c) => out.push(c),
                None => return Err(ReadErr::UnterminatedString),
            },
            Some(c) => out.push(c),
            None => return Err(ReadErr::UnterminatedString),
        }
    }
}
