//! Selector text to [`Complex`] lists.

use super::{AttrOp, Combinator, Complex, Compound, QualifiedName, Simple};
use crate::svg::error::SelectorError;

pub(super) fn parse_list(source: &str) -> Result<Vec<Complex>, SelectorError> {
    let mut parser = Parser::new(source);
    let list = parser.list()?;
    parser.skip_whitespace();
    if let Some(ch) = parser.peek() {
        return Err(parser.error(format!("unexpected `{ch}`")));
    }
    Ok(list)
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SelectorError {
        SelectorError::new(self.source, reason)
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    /// Skip whitespace, reporting whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// `complex ( , complex )*`, stopping before `)` or end of input.
    fn list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut list = vec![self.complex()?];
        loop {
            self.skip_whitespace();
            if !self.eat(',') {
                return Ok(list);
            }
            list.push(self.complex()?);
        }
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_whitespace();
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let spaced = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::Adjacent,
                Some('~') => Combinator::Sibling,
                Some(',' | ')') | None => break,
                Some(_) if spaced => Combinator::Descendant,
                Some(ch) => return Err(self.error(format!("unexpected `{ch}`"))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();

        if self.peek() == Some('*') || self.peek() == Some('|') || self.at_ident_start() {
            compound.parts.push(self.type_selector()?);
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.parts.push(Simple::Id(self.name(true)?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.parts.push(Simple::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.parts.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.parts.push(self.pseudo()?);
                }
                _ => break,
            }
        }

        if compound.parts.is_empty() {
            return Err(match self.peek() {
                Some(ch) => self.error(format!("expected a selector before `{ch}`")),
                None => self.error("expected a selector"),
            });
        }
        Ok(compound)
    }

    fn type_selector(&mut self) -> Result<Simple, SelectorError> {
        match self.qualified_name(true)? {
            QualifiedName::Plain(name) if name == "*" => Ok(Simple::Universal),
            QualifiedName::AnyPrefix(local) if local == "*" => Ok(Simple::Universal),
            name => Ok(Simple::Type(name)),
        }
    }

    /// `[prefix|]name`, where `*` may stand for either side when allowed.
    fn qualified_name(&mut self, allow_star: bool) -> Result<QualifiedName, SelectorError> {
        let first = if self.eat('*') {
            Some("*".to_string())
        } else if self.peek() == Some('|') {
            None
        } else {
            Some(self.ident()?)
        };

        // `|` followed by `=` is the dash-match operator, not a namespace
        if self.peek() == Some('|') && self.chars.get(self.pos + 1) != Some(&'=') {
            self.pos += 1;
            let local = if allow_star && self.eat('*') {
                "*".to_string()
            } else {
                self.ident()?
            };
            return Ok(match first.as_deref() {
                Some("*") => QualifiedName::AnyPrefix(local),
                Some(prefix) => QualifiedName::Prefixed(prefix.to_string(), local),
                None => QualifiedName::Prefixed(String::new(), local),
            });
        }

        match first {
            Some(name) if name != "*" || allow_star => Ok(QualifiedName::Plain(name)),
            _ => Err(self.error("expected a name")),
        }
    }

    fn attribute(&mut self) -> Result<Simple, SelectorError> {
        self.skip_whitespace();
        let name = self.qualified_name(false)?;
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(Simple::Attribute { name, test: None });
            }
            Some('=') => AttrOp::Equals,
            Some(ch @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.error(format!("expected `=` after `{ch}`")));
                }
                match ch {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.error("expected `]` or an attribute operator")),
        };
        self.expect('=')?;
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.quoted(quote)?
            }
            _ => self.name(true)?,
        };
        self.skip_whitespace();
        self.expect(']')?;

        Ok(Simple::Attribute {
            name,
            test: Some((op, value)),
        })
    }

    fn pseudo(&mut self) -> Result<Simple, SelectorError> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "not" => {
                self.expect('(')?;
                let inner = self.list()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(Simple::Not(inner))
            }
            "root" => Ok(Simple::Root),
            "first-child" => Ok(Simple::FirstChild),
            "last-child" => Ok(Simple::LastChild),
            "only-child" => Ok(Simple::OnlyChild),
            "empty" => Ok(Simple::Empty),
            other => Err(self.error(format!("unsupported pseudo-class `:{other}`"))),
        }
    }

    fn at_ident_start(&self) -> bool {
        match self.peek() {
            Some('\\') => true,
            Some('-') => self
                .chars
                .get(self.pos + 1)
                .is_some_and(|&ch| is_name_start(ch) || ch == '-' || ch == '\\'),
            Some(ch) => is_name_start(ch),
            None => false,
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        self.name(false)
    }

    /// Identifier with backslash escapes (`sodipodi\:namedview`). Ids may start
    /// with a digit.
    fn name(&mut self, digit_start: bool) -> Result<String, SelectorError> {
        let digit = digit_start && self.peek().is_some_and(|ch| ch.is_ascii_digit());
        if !digit && !self.at_ident_start() {
            return Err(self.error("expected an identifier"));
        }
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("dangling escape")),
                }
            } else if is_name_char(ch) {
                out.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(out)
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("dangling escape")),
                },
                Some(ch) if ch == quote => return Ok(out),
                Some(ch) => out.push(ch),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

#[inline]
fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || !ch.is_ascii()
}

#[inline]
fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_ascii_digit() || ch == '-'
}
