//! Minimal tokenizer for locating call sites in program source.
//!
//! Only distinguishes what prompt extraction needs: identifiers, numbers,
//! string literals, and single punctuation characters. Whitespace, line
//! continuations and `#` comments are skipped, so text inside comments or
//! strings never looks like code.

/// A lexical token borrowed from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Ident(&'a str),
    Number(&'a str),
    Str(StrLit<'a>),
    Punct(char),
}

/// A string literal as written, before escape processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit<'a> {
    /// Letters before the opening quote (`r`, `f`, `b`, ...).
    pub prefix: &'a str,
    /// Text between the quotes.
    pub body: &'a str,
    /// False when the closing quote was never found.
    pub terminated: bool,
}

impl StrLit<'_> {
    /// The literal's value, or `None` when it is not a plain constant.
    ///
    /// Unterminated literals and formatted or byte literals have no value.
    pub fn value(&self) -> Option<String> {
        if !self.terminated {
            return None;
        }
        let mut raw = false;
        for c in self.prefix.chars() {
            match c.to_ascii_lowercase() {
                'r' => raw = true,
                'u' => {}
                _ => return None,
            }
        }
        if raw {
            Some(self.body.to_string())
        } else {
            Some(unescape(self.body))
        }
    }
}

/// Iterator over the tokens of a source text.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump(c);
        }
    }

    /// Lex a string literal whose prefix starts at `prefix_start` and whose
    /// opening quote is at the current position.
    fn string(&mut self, prefix_start: usize) -> StrLit<'a> {
        let prefix = &self.src[prefix_start..self.pos];
        let Some(quote) = self.peek() else {
            return StrLit {
                prefix,
                body: "",
                terminated: false,
            };
        };
        let triple: String = std::iter::repeat_n(quote, 3).collect();
        let is_triple = self.rest().starts_with(&triple);
        self.pos += if is_triple { 3 } else { 1 };
        let body_start = self.pos;

        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump(c);
                if let Some(escaped) = self.peek() {
                    self.bump(escaped);
                }
                continue;
            }
            if c == '\n' && !is_triple {
                break;
            }
            if c == quote {
                if !is_triple {
                    let body = &self.src[body_start..self.pos];
                    self.bump(c);
                    return StrLit {
                        prefix,
                        body,
                        terminated: true,
                    };
                }
                if self.rest().starts_with(&triple) {
                    let body = &self.src[body_start..self.pos];
                    self.pos += 3;
                    return StrLit {
                        prefix,
                        body,
                        terminated: true,
                    };
                }
            }
            self.bump(c);
        }

        StrLit {
            prefix,
            body: &self.src[body_start..self.pos],
            terminated: false,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let c = self.peek()?;
            if c.is_whitespace() || c == '\\' {
                self.bump(c);
                continue;
            }
            if c == '#' {
                self.eat_while(|c| c != '\n');
                continue;
            }
            if c == '\'' || c == '"' {
                return Some(Token::Str(self.string(self.pos)));
            }
            if is_ident_start(c) {
                let start = self.pos;
                self.eat_while(is_ident_continue);
                let ident = &self.src[start..self.pos];
                if is_string_prefix(ident) && matches!(self.peek(), Some('\'' | '"')) {
                    return Some(Token::Str(self.string(start)));
                }
                return Some(Token::Ident(ident));
            }
            if c.is_ascii_digit() {
                let start = self.pos;
                self.eat_while(|c| is_ident_continue(c) || c == '.');
                return Some(Token::Number(&self.src[start..self.pos]));
            }
            self.bump(c);
            return Some(Token::Punct(c));
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_string_prefix(ident: &str) -> bool {
    ident.len() <= 2
        && ident
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'u' | 'f' | 'b'))
}

/// Decode the common backslash escapes. Unknown escapes are kept verbatim.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            // Backslash-newline is a line continuation inside the literal.
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
