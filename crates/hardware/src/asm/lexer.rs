//! Assembly tokenizer.
//!
//! Splits source text into the typed token stream the encoder consumes.
//! The surface is small: registers are written `%name`, absolute addresses
//! `$0xHEX`, integers in decimal / `0b` / `0x` form, character literals in
//! single quotes, and a function label is an identifier followed by `:`.
//! `;` and `#` start a comment running to end of line.
//!
//! Lexical failures are accumulated with their line numbers; the encoder
//! aborts entirely when any are present.

use crate::asm::error::{AsmError, AsmErrorKind};

/// Lexical class of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// `%name` — the stored text is the register name without the sigil.
    Register,
    /// `$0xHEX` — the stored text is the hex digits.
    Address,
    /// Integer literal; the stored text keeps any `0b`/`0x` prefix.
    Integer,
    /// Character literal; the stored text is the single (unescaped) char.
    Char,
    /// Bare identifier — a mnemonic or a function reference.
    Identifier,
    /// `name:` — the stored text is the name without the colon.
    Label,
    /// The operand separator.
    Comma,
}

/// One lexical token with its source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Lexical class.
    pub kind: TokenKind,
    /// Normalized token text (sigils, quotes, and the label colon are
    /// stripped; integer prefixes are kept).
    pub text: String,
    /// 1-based source line.
    pub line: u32,
}

/// Result of tokenizing a source text.
#[derive(Clone, Debug, Default)]
pub struct LexOutput {
    /// Tokens in source order.
    pub tokens: Vec<Token>,
    /// Accumulated lexical errors.
    pub errors: Vec<AsmError>,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenizes a full source text.
///
/// # Arguments
///
/// * `source` - Assembly source.
///
/// # Returns
///
/// All tokens plus any accumulated lexical errors; lexing continues past
/// errors so every bad line is reported.
pub fn tokenize(source: &str) -> LexOutput {
    let mut out = LexOutput::default();
    for (idx, line) in source.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        tokenize_line(line, line_no, &mut out);
    }
    out
}

fn tokenize_line(line: &str, line_no: u32, out: &mut LexOutput) {
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' => {
                let _ = chars.next();
            }
            ';' | '#' => return,
            ',' => {
                let _ = chars.next();
                out.tokens.push(Token {
                    kind: TokenKind::Comma,
                    text: ",".to_string(),
                    line: line_no,
                });
            }
            '%' => {
                let _ = chars.next();
                let name: String = take_while(&mut chars, is_ident_char);
                if name.is_empty() {
                    out.errors.push(AsmError::at(
                        AsmErrorKind::Lex("\"%\" without a register name".to_string()),
                        line_no,
                    ));
                } else {
                    out.tokens.push(Token {
                        kind: TokenKind::Register,
                        text: name,
                        line: line_no,
                    });
                }
            }
            '$' => {
                let _ = chars.next();
                let prefix_ok = chars.next_if_eq(&'0').is_some() && chars.next_if_eq(&'x').is_some();
                let digits: String = take_while(&mut chars, |c| c.is_ascii_hexdigit());
                if !prefix_ok || digits.is_empty() {
                    out.errors.push(AsmError::at(
                        AsmErrorKind::Lex("address literal must be written \"$0xHEX\"".to_string()),
                        line_no,
                    ));
                } else {
                    out.tokens.push(Token {
                        kind: TokenKind::Address,
                        text: digits,
                        line: line_no,
                    });
                }
            }
            '\'' => {
                let _ = chars.next();
                match take_char_literal(&mut chars) {
                    Some(value) => out.tokens.push(Token {
                        kind: TokenKind::Char,
                        text: value.to_string(),
                        line: line_no,
                    }),
                    None => out.errors.push(AsmError::at(
                        AsmErrorKind::Lex("unterminated character literal".to_string()),
                        line_no,
                    )),
                }
            }
            c if c.is_ascii_digit() => {
                let text: String = take_while(&mut chars, is_ident_char);
                out.tokens.push(Token {
                    kind: TokenKind::Integer,
                    text,
                    line: line_no,
                });
            }
            c if is_ident_start(c) => {
                let name: String = take_while(&mut chars, is_ident_char);
                if chars.next_if_eq(&':').is_some() {
                    out.tokens.push(Token {
                        kind: TokenKind::Label,
                        text: name,
                        line: line_no,
                    });
                } else {
                    out.tokens.push(Token {
                        kind: TokenKind::Identifier,
                        text: name,
                        line: line_no,
                    });
                }
            }
            other => {
                let _ = chars.next();
                out.errors.push(AsmError::at(
                    AsmErrorKind::Lex(format!("unexpected character {other:?}")),
                    line_no,
                ));
            }
        }
    }
}

fn take_while<I>(chars: &mut std::iter::Peekable<I>, pred: impl Fn(char) -> bool) -> String
where
    I: Iterator<Item = char>,
{
    let mut s = String::new();
    while let Some(&c) = chars.peek() {
        if !pred(c) {
            break;
        }
        s.push(c);
        let _ = chars.next();
    }
    s
}

/// Consumes the body and closing quote of a character literal, handling the
/// usual backslash escapes. The opening quote is already consumed.
fn take_char_literal<I>(chars: &mut std::iter::Peekable<I>) -> Option<char>
where
    I: Iterator<Item = char>,
{
    let c = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        },
        other => other,
    };
    match chars.next() {
        Some('\'') => Some(c),
        _ => None,
    }
}
