//! Recursive descent CSS parser.
//!
//! Parses CSS text into a [`StyleSheet`] (a vector of [`RuleSet`]s). Uses the
//! logos-based tokenizer from [`crate::css::tokenizer`].

use logos::Logos;

use crate::css::model::*;
use crate::css::tokenizer::Token;

/// Errors from CSS parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
}

/// A positioned token with byte-level span information for whitespace detection.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Index in the token stream (for error reporting).
    pos: usize,
    byte_start: usize,
    byte_end: usize,
}

/// Replace each `/* ... */` comment with a single space. An unterminated
/// comment swallows the rest of the input.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        result.push(' ');
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return result,
        }
    }
    result.push_str(rest);
    result
}

/// Tokenize input using logos with span information preserved.
fn tokenize_with_spans(input: &str) -> Vec<PToken> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .enumerate()
        .map(|(pos, (token, span))| PToken {
            text: input[span.clone()].to_string(),
            token,
            pos,
            byte_start: span.start,
            byte_end: span.end,
        })
        .collect()
}

/// Parse a CSS string into a [`StyleSheet`].
pub fn parse_css(input: &str) -> Result<StyleSheet, ParseError> {
    let cleaned = strip_comments(input);
    let mut parser = Parser {
        tokens: tokenize_with_spans(&cleaned),
        cursor: 0,
    };

    let mut rules = Vec::new();
    while !parser.is_eof() {
        rules.push(parser.parse_rule()?);
    }

    Ok(StyleSheet { rules })
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == token)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {:?}, got {:?} '{}'", expected, tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {expected:?}"))),
        }
    }

    /// Consume an identifier naming a class, id or property.
    fn expect_name(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            Some(tok) if tok.token == Token::Ident => Ok(tok.text),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {what}, got {:?} '{}'", tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    /// Returns `true` if the current token is immediately adjacent (no whitespace)
    /// to the previous token.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        self.peek().is_some_and(|curr| curr.byte_start == prev.byte_end)
    }

    /// Parse a single CSS rule: selector(s) `{` declarations `}`.
    fn parse_rule(&mut self) -> Result<RuleSet, ParseError> {
        let selectors = self.parse_selector_list()?;
        self.expect(&Token::BraceOpen)?;
        let declarations = self.parse_declarations()?;
        self.expect(&Token::BraceClose)?;

        Ok(RuleSet {
            selectors,
            declarations,
        })
    }

    /// Parse a comma-separated list of selectors (before `{`).
    fn parse_selector_list(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut selectors = vec![self.parse_selector()?];
        while self.peek_is(&Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }
        Ok(selectors)
    }

    /// Parse a single selector: compound selectors joined by combinators.
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = vec![SelectorPart::Compound(self.parse_compound_selector()?)];

        loop {
            match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::Child));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                // A selector start separated by whitespace is a descendant step;
                // adjacent ones were already consumed by the compound.
                Some(
                    Token::Ident
                    | Token::Hash
                    | Token::HexColor
                    | Token::Dot
                    | Token::Star
                    | Token::PseudoClass,
                ) => {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                _ => break,
            }
        }

        Ok(Selector { parts })
    }

    /// Parse one `.class`, `#id`, `:pseudo` (or hex-looking `#id`) component.
    fn parse_qualifier(&mut self) -> Result<Option<SelectorComponent>, ParseError> {
        let component = match self.peek().map(|t| (t.token.clone(), t.text.clone())) {
            Some((Token::Dot, _)) => {
                self.advance();
                SelectorComponent::Class(self.expect_name("class name after '.'")?)
            }
            Some((Token::Hash, _)) => {
                self.advance();
                SelectorComponent::Id(self.expect_name("id name after '#'")?)
            }
            Some((Token::HexColor, text)) => {
                self.advance();
                SelectorComponent::Id(text[1..].to_string())
            }
            Some((Token::PseudoClass, text)) => {
                self.advance();
                SelectorComponent::PseudoClass(text[1..].to_string())
            }
            _ => return Ok(None),
        };
        Ok(Some(component))
    }

    /// Parse a compound selector: simple selectors with no whitespace between
    /// them, e.g. `Label.Heading#title`.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut components = Vec::new();

        match self.peek().map(|t| &t.token) {
            Some(Token::Ident) => {
                if let Some(tok) = self.advance() {
                    components.push(SelectorComponent::Type(tok.text));
                }
            }
            Some(Token::Star) => {
                self.advance();
                components.push(SelectorComponent::Universal);
            }
            _ => match self.parse_qualifier()? {
                Some(component) => components.push(component),
                None => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.current_pos(),
                        message: "expected selector part".into(),
                    });
                }
            },
        }

        while self.is_adjacent() {
            match self.parse_qualifier()? {
                Some(component) => components.push(component),
                None => break,
            }
        }

        Ok(CompoundSelector { components })
    }

    /// Parse declarations between `{` and `}`.
    fn parse_declarations(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();
        while self.peek().is_some_and(|t| t.token != Token::BraceClose) {
            if self.peek_is(&Token::Semicolon) {
                self.advance();
                continue;
            }
            declarations.push(self.parse_declaration()?);
        }
        Ok(declarations)
    }

    /// Parse a single declaration: `property: value1, value2 [!important];`
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let property = self.expect_name("property name")?;
        let mut values = Vec::new();

        // `color:red` lexes as Ident + PseudoClass.
        match self.peek().map(|t| (t.token.clone(), t.text.clone())) {
            Some((Token::PseudoClass, text)) => {
                self.advance();
                values.push(DeclarationValue::Ident(text[1..].to_string()));
            }
            _ => {
                self.expect(&Token::Colon)?;
            }
        }

        let mut important = false;
        loop {
            match self.peek().map(|t| &t.token) {
                None | Some(Token::Semicolon) | Some(Token::BraceClose) => break,
                Some(Token::Important) => {
                    self.advance();
                    important = true;
                    break;
                }
                Some(_) => values.push(self.parse_declaration_value()?),
            }
        }

        if self.peek_is(&Token::Semicolon) {
            self.advance();
        }

        Ok(Declaration {
            property,
            values,
            important,
        })
    }

    /// Parse a single declaration value token into a [`DeclarationValue`].
    fn parse_declaration_value(&mut self) -> Result<DeclarationValue, ParseError> {
        let tok = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expected declaration value".into()))?;
        let invalid = |message: String| ParseError::UnexpectedToken {
            position: tok.pos,
            message,
        };

        match &tok.token {
            Token::Number => tok
                .text
                .parse()
                .map(DeclarationValue::Number)
                .map_err(|_| invalid(format!("invalid number: {}", tok.text))),
            Token::Dimension => {
                let (number, unit) = split_dimension(&tok.text)
                    .ok_or_else(|| invalid(format!("invalid dimension: {}", tok.text)))?;
                let n: f32 = number
                    .parse()
                    .map_err(|_| invalid(format!("invalid number in dimension: {number}")))?;
                Ok(DeclarationValue::Dimension(n, unit.to_string()))
            }
            Token::Ident => Ok(DeclarationValue::Ident(tok.text.clone())),
            Token::HexColor => Ok(DeclarationValue::Color(tok.text[1..].to_string())),
            Token::StringLiteral | Token::StringLiteralSingle => Ok(DeclarationValue::String(
                tok.text[1..tok.text.len() - 1].to_string(),
            )),
            Token::Comma => Ok(DeclarationValue::Comma),
            other => Err(invalid(format!(
                "unexpected token in declaration value: {:?} '{}'",
                other, tok.text
            ))),
        }
    }
}

/// Split a dimension string like "50%" or "10pt" into (number_part, unit_part).
fn split_dimension(s: &str) -> Option<(&str, &str)> {
    let unit_start = s
        .char_indices()
        .find(|(i, c)| !c.is_ascii_digit() && *c != '.' && !(*c == '-' && *i == 0))
        .map(|(i, _)| i)?;

    if unit_start == 0 || unit_start >= s.len() {
        return None;
    }

    Some((&s[..unit_start], &s[unit_start..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helper ───────────────────────────────────────────────────────

    fn parse(input: &str) -> StyleSheet {
        parse_css(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn first_rule(input: &str) -> RuleSet {
        parse(input).rules.into_iter().next().expect("expected a rule")
    }

    fn first_compound(sel: &Selector) -> &[SelectorComponent] {
        match &sel.parts[0] {
            SelectorPart::Compound(c) => &c.components,
            _ => panic!("expected compound selector at index 0"),
        }
    }

    // ── Selectors ────────────────────────────────────────────────────

    #[test]
    fn class_rule() {
        let rule = first_rule(".Heading { font-weight: bold; }");
        assert_eq!(
            first_compound(&rule.selectors[0]),
            &[SelectorComponent::Class("Heading".into())]
        );
        assert_eq!(rule.declarations[0].property, "font-weight");
        assert_eq!(rule.declarations[0].values, vec![DeclarationValue::Ident("bold".into())]);
    }

    #[test]
    fn compound_selector() {
        let rule = first_rule("Label.Heading#title { color: red; }");
        assert_eq!(
            first_compound(&rule.selectors[0]),
            &[
                SelectorComponent::Type("Label".into()),
                SelectorComponent::Class("Heading".into()),
                SelectorComponent::Id("title".into()),
            ]
        );
    }

    #[test]
    fn hex_looking_id() {
        let rule = first_rule("#bad { color: red; }");
        assert_eq!(
            first_compound(&rule.selectors[0]),
            &[SelectorComponent::Id("bad".into())]
        );

    }

    #[test]
    fn combinators() {
        let rule = first_rule("Table > Cell Label { color: red; }");
        let parts = &rule.selectors[0].parts;
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[1], SelectorPart::Combinator(Combinator::Child));
        assert_eq!(parts[3], SelectorPart::Combinator(Combinator::Descendant));
    }

    #[test]
    fn whitespace_distinguishes_compound_from_descendant() {
        let compound = first_rule("Label.x { color: red; }");
        assert_eq!(compound.selectors[0].parts.len(), 1);

        let descendant = first_rule("Label .x { color: red; }");
        assert_eq!(descendant.selectors[0].parts.len(), 3);
    }

    #[test]
    fn selector_list() {
        let rule = first_rule("Label, Text { color: green; }");
        assert_eq!(rule.selectors.len(), 2);
        assert_eq!(
            first_compound(&rule.selectors[1]),
            &[SelectorComponent::Type("Text".into())]
        );
    }

    // ── Declarations ─────────────────────────────────────────────────

    #[test]
    fn dimensions_and_colors() {
        let rule = first_rule("* { font-size: 12pt; color: #ff0000; width: 50%; }");
        assert_eq!(
            rule.declarations[0].values,
            vec![DeclarationValue::Dimension(12.0, "pt".into())]
        );
        assert_eq!(
            rule.declarations[1].values,
            vec![DeclarationValue::Color("ff0000".into())]
        );
        assert_eq!(
            rule.declarations[2].values,
            vec![DeclarationValue::Dimension(50.0, "%".into())]
        );
    }

    #[test]
    fn comma_separated_values() {
        let rule = first_rule(".S { font-family: \"Times New Roman\", serif; }");
        assert_eq!(
            rule.declarations[0].values,
            vec![
                DeclarationValue::String("Times New Roman".into()),
                DeclarationValue::Comma,
                DeclarationValue::Ident("serif".into()),
            ]
        );
    }

    #[test]
    fn important_flag() {
        let rule = first_rule(".S { color: red !important; }");
        assert!(rule.declarations[0].important);
    }

    #[test]
    fn colon_without_space() {
        let rule = first_rule(".S { color:red; font-size:10pt }");
        assert_eq!(rule.declarations[0].values, vec![DeclarationValue::Ident("red".into())]);
        assert_eq!(
            rule.declarations[1].values,
            vec![DeclarationValue::Dimension(10.0, "pt".into())]
        );
    }

    #[test]
    fn stray_semicolons_and_missing_trailing_semicolon() {
        let rule = first_rule(".S { ; color: red;; font-weight: bold }");
        assert_eq!(rule.declarations.len(), 2);
    }

    // ── Sheets & errors ──────────────────────────────────────────────

    #[test]
    fn comments_are_ignored() {
        let sheet = parse("/* a */ .A { color: red; } /* é */ .B { /* x */ color: blue; }");
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[1].declarations.len(), 1);
    }

    #[test]
    fn empty_input() {
        assert!(parse("").rules.is_empty());
        assert!(parse("/* only */").rules.is_empty());
    }

    #[test]
    fn unclosed_brace() {
        assert!(matches!(
            parse_css(".A { color: red;"),
            Err(ParseError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn missing_selector() {
        assert!(matches!(
            parse_css("{ color: red; }"),
            Err(ParseError::UnexpectedToken { position: 0, .. })
        ));
    }

    // ── Helpers ──────────────────────────────────────────────────────

    #[test]
    fn strip_comments_handles_unicode_and_unterminated() {
        assert_eq!(strip_comments("a/* x */b"), "a b");
        assert_eq!(strip_comments("ü/* x */ü"), "ü ü");
        assert_eq!(strip_comments("a /* open"), "a  ");
    }

    #[test]
    fn split_dimension_forms() {
        assert_eq!(split_dimension("10pt"), Some(("10", "pt")));
        assert_eq!(split_dimension("-1.5in"), Some(("-1.5", "in")));
        assert_eq!(split_dimension("50%"), Some(("50", "%")));
        assert_eq!(split_dimension("12"), None);
    }
}
