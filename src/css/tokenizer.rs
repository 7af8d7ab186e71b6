//! Lexer for design stylesheets.
//!
//! Longer tokens win over their prefixes, so `#ff00aa` is a
//! [`Token::HexColor`], `10pt` a [`Token::Dimension`] and `:first-child` a
//! [`Token::PseudoClass`]. A hex-looking id selector such as `#bad` still
//! lexes as `HexColor`; the parser reinterprets it in selector position.

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// `!important` flag.
    #[token("!important")]
    Important,

    /// CSS hex color: `#fff`, `#ff00aa` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Length with a print unit: `10pt`, `1.5in`, `2em`, `50%`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?(pt|px|pc|em|ex|in|cm|mm|%)")]
    Dimension,

    /// Pseudo-class: `:hover`, `:first-child`.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoClass,

    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Number: integer or float, possibly negative.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier: property names, selector names, keywords.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("#")]
    Hash,

    #[token("*")]
    Star,

    #[token(">")]
    GreaterThan,
}

/// Tokenize a CSS string into `(Token, text)` pairs. Characters that fail to
/// lex are dropped.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, input[span].to_string())))
        .collect()
}
