use std::fmt::Display;

/// Line and column of a token, both starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub token: TokenType,
    pub lexeme: String,
    pub pos: Position,
}

impl Token {
    pub fn new(token: TokenType, lexeme: impl Into<String>, pos: Position) -> Self {
        Self {
            token,
            lexeme: lexeme.into(),
            pos,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralType {
    Identifier(String),
    Integer(i64),
    Real(f64),
    String(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenType {
    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    // Operators
    Arrow,
    Equal,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    BangEqual,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    AndAnd,
    OrOr,

    Literal(LiteralType),

    // Keywords
    Var,
    Inteiro,
    Real,
    Booleano,
    Texto,
    Leia,
    Escreva,
    Se,
    Senao,
    Enquanto,
    Verdadeiro,
    Falso,

    EOF,
}

impl TokenType {
    /// Short upper-case kind name, used by the token dump.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenType::LeftParen
            | TokenType::RightParen
            | TokenType::LeftBrace
            | TokenType::RightBrace
            | TokenType::Comma
            | TokenType::Semicolon => "PUNCT",
            TokenType::Arrow | TokenType::Equal => "ATRIB",
            TokenType::Plus | TokenType::Minus => "OPSUM",
            TokenType::Star | TokenType::Slash | TokenType::Percent => "OPMULT",
            TokenType::BangEqual
            | TokenType::EqualEqual
            | TokenType::Greater
            | TokenType::GreaterEqual
            | TokenType::Less
            | TokenType::LessEqual => "OPCOMP",
            TokenType::AndAnd | TokenType::OrOr => "OPLOG",
            TokenType::Bang => "NOT",
            TokenType::Literal(LiteralType::Identifier(_)) => "ID",
            TokenType::Literal(LiteralType::Integer(_)) => "INT",
            TokenType::Literal(LiteralType::Real(_)) => "REAL",
            TokenType::Literal(LiteralType::String(_)) => "STRING",
            TokenType::EOF => "EOF",
            _ => "KEYWORD",
        }
    }

    /// True for tokens that can only begin a statement.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenType::Var
                | TokenType::Inteiro
                | TokenType::Real
                | TokenType::Booleano
                | TokenType::Texto
                | TokenType::Leia
                | TokenType::Escreva
                | TokenType::Se
                | TokenType::Enquanto
        )
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenType::LeftParen => "'('",
            TokenType::RightParen => "')'",
            TokenType::LeftBrace => "'{'",
            TokenType::RightBrace => "'}'",
            TokenType::Comma => "','",
            TokenType::Semicolon => "';'",
            TokenType::Arrow => "'<-'",
            TokenType::Equal => "'='",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Star => "'*'",
            TokenType::Slash => "'/'",
            TokenType::Percent => "'%'",
            TokenType::Bang => "'!'",
            TokenType::BangEqual => "'!='",
            TokenType::EqualEqual => "'=='",
            TokenType::Greater => "'>'",
            TokenType::GreaterEqual => "'>='",
            TokenType::Less => "'<'",
            TokenType::LessEqual => "'<='",
            TokenType::AndAnd => "'&&'",
            TokenType::OrOr => "'||'",
            TokenType::Literal(LiteralType::Identifier(id)) => {
                return write!(f, "identifier '{}'", id)
            }
            TokenType::Literal(LiteralType::Integer(n)) => return write!(f, "number {}", n),
            TokenType::Literal(LiteralType::Real(n)) => return write!(f, "number {}", n),
            TokenType::Literal(LiteralType::String(s)) => return write!(f, "string \"{}\"", s),
            TokenType::Var => "'var'",
            TokenType::Inteiro => "'inteiro'",
            TokenType::Real => "'real'",
            TokenType::Booleano => "'booleano'",
            TokenType::Texto => "'texto'",
            TokenType::Leia => "'leia'",
            TokenType::Escreva => "'escreva'",
            TokenType::Se => "'se'",
            TokenType::Senao => "'senao'",
            TokenType::Enquanto => "'enquanto'",
            TokenType::Verdadeiro => "'verdadeiro'",
            TokenType::Falso => "'falso'",
            TokenType::EOF => "end of input",
        };
        write!(f, "{}", text)
    }
}

pub fn reserved_to_tokentype(id: &str) -> Option<TokenType> {
    Some(match id {
        "var" => TokenType::Var,
        "inteiro" => TokenType::Inteiro,
        "real" => TokenType::Real,
        "booleano" => TokenType::Booleano,
        "texto" => TokenType::Texto,
        "leia" => TokenType::Leia,
        "escreva" => TokenType::Escreva,
        "se" => TokenType::Se,
        "senao" | "senão" => TokenType::Senao,
        "enquanto" => TokenType::Enquanto,
        "verdadeiro" => TokenType::Verdadeiro,
        "falso" => TokenType::Falso,
        _ => return None,
    })
}
