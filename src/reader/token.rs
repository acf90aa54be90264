//! Module for splitting source text into lexical tokens.

use crate::reader::{ReadErr, ReadResult};

/// Split the input into its constituent tokens.
///
/// A token is a slice of the input: a structural marker (`( ) [ ] { }`),
/// a reader shorthand (`' ` ~ ~@ ^ @`), a string literal (possibly missing
/// its closing quote; the atom reader reports that), or a bare atom.
/// Whitespace, commas, and `;`-to-end-of-line comments separate tokens and
/// are not emitted.
pub fn tokenize(input: &str) -> ReadResult<Vec<&str>> {
    let mut result = Vec::new();

    let mut rest = input;
    while !rest.is_empty() {
        let next = next_token(rest)?;

        // Invariant: the scan advances on every step, or the loop would
        // never terminate.
        if next.remainder.len() >= rest.len() {
            let stuck: String = rest.chars().take(8).collect();
            return Err(ReadErr::Internal(format!(
                "tokenizer failed to advance at {stuck:?}"
            )));
        }

        if let Some(token) = next.token {
            result.push(token);
        }
        rest = next.remainder;
    }

    Ok(result)
}

struct NextToken<'a> {
    // Token retrieved, if any.
    // May be None if only whitespace or a comment was consumed.
    token: Option<&'a str>,

    // Remaining input.
    remainder: &'a str,
}

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn space() -> &'static Regex {
        static SPACE: OnceLock<Regex> = OnceLock::new();
        SPACE.get_or_init(|| {
            Regex::new(r#"\A[\s,]+"#).expect("could not compile regex for empty space")
        })
    }

    pub(super) fn comment() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| Regex::new(r#"\A;.*"#).expect("could not compile regex for comment"))
    }

    pub(super) fn string() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Quote,
            // followed by:
            //  - a backslash + character (an escaped character, of any sort), or
            //  - any character other than a quote or backslash
            // repeatedly,
            // followed by the closing quote if there is one.
            // The closing quote is optional so that an unterminated string
            // still becomes a token; the atom reader reports it.
            Regex::new(r#"\A"(?s:\\.|[^\\"])*"?"#).expect("could not compile regex for string")
        })
    }

    pub(super) fn atom() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Everything up to whitespace, a comma, a bracketing character,
            // a quote of either kind, or a semicolon. `~ ^ @` only start
            // shorthand at the head of a token; inside a run they are
            // ordinary atom characters.
            Regex::new(r#"\A[^\s,\[\]{}('"`;)]+"#).expect("could not compile regex for atom")
        })
    }
}

/// Get the next token from the input, and return the remainder of the input.
fn next_token(input: &str) -> ReadResult<NextToken<'_>> {
    // Shouldn't bother calling if nothing remains.
    assert!(!input.is_empty());

    // The two-character shorthand outranks single `~`:
    if input.starts_with("~@") {
        return Ok(NextToken {
            token: Some(&input[..2]),
            remainder: &input[2..],
        });
    }

    // Single-character matchers:
    if matches!(
        input.as_bytes()[0],
        b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'\'' | b'`' | b'~' | b'^' | b'@'
    ) {
        return Ok(NextToken {
            token: Some(&input[..1]),
            remainder: &input[1..],
        });
    }

    // Regex matchers:
    if let Some(space) = regex::space().find(input) {
        return Ok(NextToken {
            token: None,
            remainder: &input[space.end()..],
        });
    }
    if let Some(comment) = regex::comment().find(input) {
        // Comments carry nothing the parser wants.
        return Ok(NextToken {
            token: None,
            remainder: &input[comment.end()..],
        });
    }
    if let Some(string) = regex::string().find(input) {
        return Ok(NextToken {
            token: Some(string.as_str()),
            remainder: &input[string.end()..],
        });
    }
    if let Some(atom) = regex::atom().find(input) {
        return Ok(NextToken {
            token: Some(atom.as_str()),
            remainder: &input[atom.end()..],
        });
    }

    Err(ReadErr::Internal(
        "could not tokenize remainder of input".to_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_atoms() -> ReadResult<()> {
        let input = r#"hello "hi" world 24601 -6 -3.33"#;
        let want = vec!["hello", r#""hi""#, "world", "24601", "-6", "-3.33"];
        assert_eq!(tokenize(input)?, want);
        Ok(())
    }

    #[test]
    fn tokenize_delimiters() -> ReadResult<()> {
        let input = "(1)[ 2 ]{:a 1}";
        let want = vec!["(", "1", ")", "[", "2", "]", "{", ":a", "1", "}"];
        assert_eq!(tokenize(input)?, want);
        Ok(())
    }

    #[test]
    fn tokenize_shorthand() -> ReadResult<()> {
        let input = "'a `b ~c ~@d @e ^f";
        let want = vec!["'", "a", "`", "b", "~", "c", "~@", "d", "@", "e", "^", "f"];
        assert_eq!(tokenize(input)?, want);
        Ok(())
    }

    #[test]
    fn shorthand_characters_inside_atoms() -> ReadResult<()> {
        // `~ ^ @` only mean something at the head of a token.
        assert_eq!(tokenize("a~b a^b a@b")?, vec!["a~b", "a^b", "a@b"]);
        Ok(())
    }

    #[test]
    fn commas_are_whitespace() -> ReadResult<()> {
        assert_eq!(tokenize("1,2, 3,")?, vec!["1", "2", "3"]);
        Ok(())
    }

    #[test]
    fn comments_are_dropped() -> ReadResult<()> {
        assert_eq!(tokenize("1 ; rest of the line\n2")?, vec!["1", "2"]);
        assert_eq!(tokenize(";; nothing but comment")?, Vec::<&str>::new());
        Ok(())
    }

    #[test]
    fn strings_keep_their_quotes_and_escapes() -> ReadResult<()> {
        let input = r#"("say \"hi\"" x)"#;
        assert_eq!(tokenize(input)?, vec!["(", r#""say \"hi\"""#, "x", ")"]);
        Ok(())
    }

    #[test]
    fn unterminated_string_still_becomes_a_token() -> ReadResult<()> {
        assert_eq!(tokenize(r#""abc"#)?, vec![r#""abc"#]);
        Ok(())
    }

    #[test]
    fn multiline_string_is_one_token() -> ReadResult<()> {
        let input = "\"a\nb\" rest";
        assert_eq!(tokenize(input)?, vec!["\"a\nb\"", "rest"]);
        Ok(())
    }

    #[test]
    fn every_character_class_advances() {
        // Regression for tokenizer stalls: every grammar class, alone and
        // mixed, must terminate with a finite token count.
        let inputs = [
            " ", ",", "(", ")", "[", "]", "{", "}", "'", "`", "~", "~@", "^", "@", "\"", "\"x",
            ";", "; note", "x", ":k", "\\", "1", "-", "é",
            "(1 [2] {3} 'a `b ~c ~@d @e ^f \"g\" ; h\n :i -7 8.9 j,k)",
        ];
        for input in inputs {
            let tokens = tokenize(input).unwrap();
            assert!(tokens.len() <= input.len(), "input {:?}", input);
        }
    }
}
