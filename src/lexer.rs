use super::tokens::{reserved_to_tokentype, LiteralType, Position, Token, TokenType};
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected character {found:?} found on {pos}.")]
    UnexpectedCharacter { found: char, pos: Position },
    #[error("Unterminated string starting on {pos}.")]
    UnterminatedString { pos: Position },
    #[error("Unterminated block comment starting on {pos}.")]
    UnterminatedComment { pos: Position },
    #[error("Invalid number format {literal:?} on {pos}. No digit provided after decimal point?")]
    InvalidNumberFormat { literal: String, pos: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { pos, .. }
            | LexError::UnterminatedString { pos }
            | LexError::UnterminatedComment { pos }
            | LexError::InvalidNumberFormat { pos, .. } => *pos,
        }
    }
}

/// Lazy scanner over a source string.
///
/// Yields one token per call and a single `EOF` token at the end. A lexical
/// error is yielded in place of a token; scanning then resumes with the next
/// character, so callers can collect every error in one pass.
#[derive(Debug)]
pub struct Lexer<'source> {
    source: &'source str,
    chars: Peekable<CharIndices<'source>>,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Rewinds to the start of the source. Tokens are scanned again.
    pub fn reset(&mut self) {
        self.chars = self.source.char_indices().peekable();
        self.line = 1;
        self.column = 1;
        self.finished = false;
    }

    fn cursor(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn offset(&mut self) -> usize {
        let len = self.source.len();
        self.chars.peek().map_or(len, |(i, _)| *i)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn advance_if(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        if self.chars.peek().map_or(false, |&(_, c)| pred(c)) {
            self.advance().map(|(_, c)| c)
        } else {
            None
        }
    }

    fn matches(&mut self, expected: char) -> bool {
        self.advance_if(|c| c == expected).is_some()
    }

    fn scan_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            let pos = self.cursor();
            let (start, c) = match self.advance() {
                Some(next) => next,
                None => return Ok(None),
            };
            let token = match c {
                // Single-character tokens
                '(' => TokenType::LeftParen,
                ')' => TokenType::RightParen,
                '{' => TokenType::LeftBrace,
                '}' => TokenType::RightBrace,
                ',' => TokenType::Comma,
                ';' => TokenType::Semicolon,
                '-' => TokenType::Minus,
                '+' => TokenType::Plus,
                '*' => TokenType::Star,
                '%' => TokenType::Percent,
                // Two-character tokens
                '!' => {
                    if self.matches('=') {
                        TokenType::BangEqual
                    } else {
                        TokenType::Bang
                    }
                }
                '=' => {
                    if self.matches('=') {
                        TokenType::EqualEqual
                    } else {
                        TokenType::Equal
                    }
                }
                '<' => {
                    if self.matches('=') {
                        TokenType::LessEqual
                    } else if self.matches('-') {
                        TokenType::Arrow
                    } else {
                        TokenType::Less
                    }
                }
                '>' => {
                    if self.matches('=') {
                        TokenType::GreaterEqual
                    } else {
                        TokenType::Greater
                    }
                }
                '&' if self.matches('&') => TokenType::AndAnd,
                '|' if self.matches('|') => TokenType::OrOr,
                // Comments
                '/' => {
                    if self.matches('/') {
                        while self.advance_if(|c| c != '\n').is_some() {}
                        continue;
                    } else if self.matches('*') {
                        self.block_comment(pos)?;
                        continue;
                    } else {
                        TokenType::Slash
                    }
                }
                '"' => self.string(pos)?,
                '0'..='9' => self.number(start, pos)?,
                c if c.is_alphabetic() || c == '_' => self.identifier(start),
                c if c.is_whitespace() => continue,
                found => return Err(LexError::UnexpectedCharacter { found, pos }),
            };
            let end = self.offset();
            return Ok(Some(Token::new(token, &self.source[start..end], pos)));
        }
    }

    fn block_comment(&mut self, pos: Position) -> Result<(), LexError> {
        while let Some((_, c)) = self.advance() {
            if c == '*' && self.matches('/') {
                return Ok(());
            }
        }
        Err(LexError::UnterminatedComment { pos })
    }

    fn string(&mut self, pos: Position) -> Result<TokenType, LexError> {
        let mut s = String::new();
        while let Some((_, ch)) = self.advance() {
            match ch {
                '"' => return Ok(TokenType::Literal(LiteralType::String(s))),
                '\\' => match self.advance() {
                    Some((_, 'n')) => s.push('\n'),
                    Some((_, 't')) => s.push('\t'),
                    Some((_, other)) => s.push(other),
                    None => break,
                },
                ch => s.push(ch),
            }
        }
        Err(LexError::UnterminatedString { pos })
    }

    fn number(&mut self, start: usize, pos: Position) -> Result<TokenType, LexError> {
        while self.advance_if(|c| c.is_ascii_digit()).is_some() {}
        let mut is_real = false;
        if self.matches('.') {
            // Make sure number after decimal is digit
            if self.advance_if(|c| c.is_ascii_digit()).is_none() {
                let end = self.offset();
                return Err(LexError::InvalidNumberFormat {
                    literal: self.source[start..end].to_string(),
                    pos,
                });
            }
            while self.advance_if(|c| c.is_ascii_digit()).is_some() {}
            is_real = true;
        }
        let end = self.offset();
        let literal = &self.source[start..end];
        let invalid = || LexError::InvalidNumberFormat {
            literal: literal.to_string(),
            pos,
        };
        Ok(if is_real {
            TokenType::Literal(LiteralType::Real(
                literal.parse().map_err(|_| invalid())?,
            ))
        } else {
            TokenType::Literal(LiteralType::Integer(
                literal.parse().map_err(|_| invalid())?,
            ))
        })
    }

    fn identifier(&mut self, start: usize) -> TokenType {
        while self
            .advance_if(|c| c.is_alphanumeric() || c == '_')
            .is_some()
        {}
        let end = self.offset();
        let id = &self.source[start..end];
        // Check against keywords
        reserved_to_tokentype(id)
            .unwrap_or_else(|| TokenType::Literal(LiteralType::Identifier(id.to_string())))
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        Some(match self.scan_token() {
            Ok(Some(token)) => Ok(token),
            Ok(None) => {
                self.finished = true;
                Ok(Token::new(TokenType::EOF, "", self.cursor()))
            }
            Err(e) => Err(e),
        })
    }
}

/// Scans the whole source, splitting tokens from errors.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for result in Lexer::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }
    (tokens, errors)
}

/// Tests
/// Note: expected arrays omit EOF
#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<TokenType> {
        let (tokens, errors) = tokenize(input);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().map(|t| t.token).collect()
    }

    fn id(name: &str) -> TokenType {
        TokenType::Literal(LiteralType::Identifier(name.to_string()))
    }

    #[test]
    fn test_single_tokens() {
        let expected = [
            TokenType::LeftParen,
            TokenType::RightParen,
            TokenType::LeftBrace,
            TokenType::RightBrace,
            TokenType::Comma,
            TokenType::Minus,
            TokenType::Plus,
            TokenType::Star,
            TokenType::Percent,
            TokenType::Semicolon,
            TokenType::EOF,
        ];
        assert_eq!(scan("(){},-+*%;"), expected.to_vec());
    }

    #[test]
    fn test_double_tokens() {
        let expected = [
            TokenType::Bang,
            TokenType::BangEqual,
            TokenType::Equal,
            TokenType::EqualEqual,
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
            TokenType::Arrow,
            TokenType::AndAnd,
            TokenType::OrOr,
        ];
        let tokens = scan("! != = == > >= < <= <- && ||");
        assert_eq!(&tokens[..expected.len()], &expected[..]);
    }

    #[test]
    fn test_literal_tokens() {
        let input = r#"Contador _interno "minha string" 0.1 123 123.45 ação"#;
        let expected = [
            id("Contador"),
            id("_interno"),
            TokenType::Literal(LiteralType::String("minha string".to_string())),
            TokenType::Literal(LiteralType::Real(0.1)),
            TokenType::Literal(LiteralType::Integer(123)),
            TokenType::Literal(LiteralType::Real(123.45)),
            id("ação"),
        ];
        let tokens = scan(input);
        assert_eq!(&tokens[..expected.len()], &expected[..]);
    }

    #[test]
    fn test_reserved_tokens() {
        let input =
            "var inteiro real booleano texto leia escreva se senao senão enquanto verdadeiro falso";
        let expected = [
            TokenType::Var,
            TokenType::Inteiro,
            TokenType::Real,
            TokenType::Booleano,
            TokenType::Texto,
            TokenType::Leia,
            TokenType::Escreva,
            TokenType::Se,
            TokenType::Senao,
            TokenType::Senao,
            TokenType::Enquanto,
            TokenType::Verdadeiro,
            TokenType::Falso,
        ];
        let tokens = scan(input);
        assert_eq!(&tokens[..expected.len()], &expected[..]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = scan(r#""a\"b\n\\""#);
        assert_eq!(
            tokens[0],
            TokenType::Literal(LiteralType::String("a\"b\n\\".to_string()))
        );
    }

    #[test]
    fn test_mixed_tokens_with_positions() {
        let input = "se (i == 6) {\n    escreva(\"oi\");\n}";
        let (tokens, errors) = tokenize(input);
        assert!(errors.is_empty());
        let expected = [
            (TokenType::Se, 1, 1),
            (TokenType::LeftParen, 1, 4),
            (id("i"), 1, 5),
            (TokenType::EqualEqual, 1, 7),
            (TokenType::Literal(LiteralType::Integer(6)), 1, 10),
            (TokenType::RightParen, 1, 11),
            (TokenType::LeftBrace, 1, 13),
            (TokenType::Escreva, 2, 5),
            (TokenType::LeftParen, 2, 12),
            (
                TokenType::Literal(LiteralType::String("oi".to_string())),
                2,
                13,
            ),
            (TokenType::RightParen, 2, 17),
            (TokenType::Semicolon, 2, 18),
            (TokenType::RightBrace, 3, 1),
            (TokenType::EOF, 3, 2),
        ];
        assert_eq!(tokens.len(), expected.len());
        for (token, (ttype, line, column)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(&token.token, ttype);
            assert_eq!(token.pos, Position::new(*line, *column), "{:?}", token);
        }
        assert_eq!(tokens[9].lexeme, "\"oi\"");
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "1 // comentario\n/* bloco\n de comentario */ 2";
        let (tokens, _) = tokenize(input);
        assert_eq!(tokens[0].token, TokenType::Literal(LiteralType::Integer(1)));
        assert_eq!(tokens[1].token, TokenType::Literal(LiteralType::Integer(2)));
        assert_eq!(tokens[1].pos, Position::new(3, 19));
    }

    #[test]
    fn test_unexpected_tokens_continue_scanning() {
        let (tokens, errors) = tokenize("x $ y # 1");
        assert_eq!(
            errors,
            vec![
                LexError::UnexpectedCharacter {
                    found: '$',
                    pos: Position::new(1, 3),
                },
                LexError::UnexpectedCharacter {
                    found: '#',
                    pos: Position::new(1, 7),
                },
            ]
        );
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.token).collect();
        assert_eq!(
            kinds,
            vec![
                id("x"),
                id("y"),
                TokenType::Literal(LiteralType::Integer(1)),
                TokenType::EOF
            ]
        );
    }

    #[test]
    fn test_single_ampersand_is_an_error() {
        let (_, errors) = tokenize("a & b");
        assert_eq!(
            errors,
            vec![LexError::UnexpectedCharacter {
                found: '&',
                pos: Position::new(1, 3),
            }]
        );
    }

    #[test]
    fn test_invalid_number_format() {
        // Fails because non-digit comes after decimal point
        let (_, errors) = tokenize("1.XXX");
        assert_eq!(
            errors[0],
            LexError::InvalidNumberFormat {
                literal: "1.".to_string(),
                pos: Position::new(1, 1),
            }
        );
    }

    #[test]
    fn test_integer_overflow() {
        let (_, errors) = tokenize("99999999999999999999");
        assert!(matches!(errors[0], LexError::InvalidNumberFormat { .. }));
    }

    #[test]
    fn test_unterminated_string_and_comment() {
        let (tokens, errors) = tokenize("\"aberta");
        assert_eq!(
            errors,
            vec![LexError::UnterminatedString {
                pos: Position::new(1, 1)
            }]
        );
        assert_eq!(tokens.last().map(|t| &t.token), Some(&TokenType::EOF));

        let (_, errors) = tokenize("1 /* sem fim");
        assert_eq!(
            errors,
            vec![LexError::UnterminatedComment {
                pos: Position::new(1, 3)
            }]
        );
    }

    #[test]
    fn test_eof_is_yielded_once() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next().unwrap().unwrap().token, TokenType::EOF);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_reset_rescans() {
        let mut lexer = Lexer::new("a <- 1;");
        let first: Vec<_> = lexer.by_ref().map(|t| t.unwrap()).collect();
        lexer.reset();
        let second: Vec<_> = lexer.map(|t| t.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_line_count() {
        let input = "1
        // random comment2
        3
        4
        5";
        let (tokens, _) = tokenize(input);
        assert_eq!(tokens.last().unwrap().pos.line, 5);
    }
}
