use crate::error::{SigilError, SigilResult, Span};
use crate::token::{Token, TokenKind, lookup_keyword};
pub struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&mut self) -> SigilResult<Vec<Token>> {
        let mut tokens = Vec::with_capacity(self.source.len() / 4);

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(
                    TokenKind::Eof,
                    Span::new(self.line, self.col, 0),
                ));
                break;
            }

            let token = self.scan_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }
    fn scan_token(&mut self) -> SigilResult<Token> {
        let start_line = self.line;
        let start_col = self.col;
        let start_pos = self.pos;

        let byte = self.advance();

        let kind = match byte {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'~' => TokenKind::Tilde,

            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'^' => TokenKind::Caret,

            b'=' => {
                if self.match_byte(b'=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            b'!' => {
                if self.match_byte(b'=') {
                    TokenKind::BangEq
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.match_byte(b'=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.match_byte(b'=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'&' => {
                if self.match_byte(b'&') {
                    TokenKind::AmpAmp
                } else {
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.match_byte(b'|') {
                    TokenKind::PipePipe
                } else {
                    TokenKind::Pipe
                }
            }

            b'"' | b'\'' => return self.scan_string(byte, start_line, start_col, start_pos),

            b'0'..=b'9' => self.scan_number(byte, start_line, start_col)?,

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start_pos)?,

            _ => {
                return Err(SigilError::lexer(
                    format!("unexpected character: '{}'", byte as char),
                    Span::new(start_line, start_col, 1),
                ));
            }
        };

        let len = (self.pos - start_pos) as u32;
        Ok(Token::new(kind, Span::new(start_line, start_col, len)))
    }
    fn scan_string(
        &mut self,
        quote: u8,
        start_line: u32,
        start_col: u32,
        start_pos: usize,
    ) -> SigilResult<Token> {
        let mut buf = Vec::new();

        loop {
            if self.is_at_end() {
                return Err(SigilError::lexer(
                    "unterminated byte-string literal",
                    Span::new(start_line, start_col, 1),
                ));
            }

            let byte = self.peek();

            if byte == quote {
                self.advance();
                break;
            }

            if byte == b'\\' {
                self.advance();
                if self.is_at_end() {
                    return Err(SigilError::lexer(
                        "unterminated escape sequence",
                        Span::new(self.line, self.col, 1),
                    ));
                }

                let esc = self.advance();
                match esc {
                    b'n' => buf.push(b'\n'),
                    b'r' => buf.push(b'\r'),
                    b't' => buf.push(b'\t'),
                    b'\\' => buf.push(b'\\'),
                    b'\'' => buf.push(b'\''),
                    b'"' => buf.push(b'"'),
                    b'0' => buf.push(0),
                    _ => {
                        buf.push(b'\\');
                        buf.push(esc);
                    }
                }
                continue;
            }

            if byte == b'\n' {
                self.line += 1;
                self.col = 0;
            }
            self.advance();
            buf.push(byte);
        }

        let total_len = (self.pos - start_pos) as u32;
        let span = Span::new(start_line, start_col, total_len);
        Ok(Token::new(TokenKind::Bytes(buf), span))
    }
    fn scan_number(&mut self, first: u8, start_line: u32, start_col: u32) -> SigilResult<TokenKind> {
        if first == b'0' && !self.is_at_end() {
            match self.peek() {
                b'x' | b'X' => {
                    self.advance();
                    return self.scan_radix_number(16, "hex", "0x", start_line, start_col);
                }
                b'b' | b'B' => {
                    self.advance();
                    return self.scan_radix_number(2, "binary", "0b", start_line, start_col);
                }
                b'o' | b'O' => {
                    self.advance();
                    return self.scan_radix_number(8, "octal", "0o", start_line, start_col);
                }
                _ => {}
            }
        }

        let mut num_str = String::new();
        num_str.push(first as char);

        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == b'_') {
            let b = self.advance();
            if b != b'_' {
                num_str.push(b as char);
            }
        }

        let value: u64 = num_str.parse().map_err(|_| {
            SigilError::lexer(
                format!("integer literal out of range: {}", num_str),
                Span::new(start_line, start_col, num_str.len() as u32),
            )
        })?;

        Ok(TokenKind::Int(value))
    }

    fn scan_radix_number(
        &mut self,
        radix: u32,
        name: &str,
        prefix: &str,
        start_line: u32,
        start_col: u32,
    ) -> SigilResult<TokenKind> {
        let mut digits = String::new();

        let is_valid_digit = |b: u8| -> bool {
            match radix {
                16 => b.is_ascii_hexdigit(),
                8 => (b'0'..=b'7').contains(&b),
                2 => b == b'0' || b == b'1',
                _ => false,
            }
        };

        while !self.is_at_end() && (is_valid_digit(self.peek()) || self.peek() == b'_') {
            let b = self.advance();
            if b != b'_' {
                digits.push(b as char);
            }
        }

        if digits.is_empty() {
            return Err(SigilError::lexer(
                format!("expected {} digits after '{}'", name, prefix),
                Span::new(start_line, start_col, prefix.len() as u32),
            ));
        }

        let value = u64::from_str_radix(&digits, radix).map_err(|_| {
            SigilError::lexer(
                format!("invalid {} literal: {}{}", name, prefix, digits),
                Span::new(
                    start_line,
                    start_col,
                    digits.len() as u32 + prefix.len() as u32,
                ),
            )
        })?;

        Ok(TokenKind::Int(value))
    }
    fn scan_identifier(&mut self, start_pos: usize) -> SigilResult<TokenKind> {
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            self.advance();
        }

        let text = std::str::from_utf8(&self.source[start_pos..self.pos]).map_err(|_| {
            SigilError::lexer(
                "invalid UTF-8 in identifier",
                Span::new(self.line, self.col, (self.pos - start_pos) as u32),
            )
        })?;

        match lookup_keyword(text) {
            Some(keyword) => Ok(keyword),
            None => Ok(TokenKind::Ident(text.to_string())),
        }
    }
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while !self.is_at_end() {
                match self.peek() {
                    b' ' | b'\t' | b'\r' => {
                        self.advance();
                    }
                    b'\n' => {
                        self.advance();
                        self.line += 1;
                        self.col = 1;
                    }
                    _ => break,
                }
            }

            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'/'
                && self.source[self.pos + 1] == b'/'
            {
                let remaining = &self.source[self.pos..];
                match memchr::memchr(b'\n', remaining) {
                    Some(offset) => {
                        self.pos += offset;
                        self.col += offset as u32;
                    }
                    None => {
                        let skip = self.source.len() - self.pos;
                        self.col += skip as u32;
                        self.pos = self.source.len();
                    }
                }
                continue;
            }

            break;
        }
    }
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.source[self.pos]
    }

    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let byte = self.source[self.pos];
        self.pos += 1;
        self.col += 1;
        byte
    }

    #[inline]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.source[self.pos] == expected {
            self.pos += 1;
            self.col += 1;
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}
