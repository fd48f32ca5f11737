//! Lexer for the `OpenQASM` dialect.
//!
//! Accepts both QASM 2 (`qreg q[2];`, `measure q -> c;`) and QASM 3
//! (`qubit[2] q;`, `c = measure q;`) surface forms for the constructs the
//! simulator understands.

use logos::Logos;

/// Tokens for the accepted dialect.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    // Newlines are lexed (not skipped) so the parser can track line numbers.
    #[token("\n")]
    Newline,

    // Keywords
    #[token("OPENQASM")]
    OpenQasm,

    #[token("include")]
    Include,

    #[token("qubit")]
    Qubit,

    #[token("bit")]
    Bit,

    #[token("qreg")]
    Qreg,

    #[token("creg")]
    Creg,

    #[token("measure")]
    Measure,

    #[token("reset")]
    Reset,

    #[token("barrier")]
    Barrier,

    // Constants
    #[token("pi")]
    Pi,

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringLiteral(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators and punctuation
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("=")]
    Eq,

    #[token("->")]
    Arrow,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Newline => write!(f, "newline"),
            Token::OpenQasm => write!(f, "OPENQASM"),
            Token::Include => write!(f, "include"),
            Token::Qubit => write!(f, "qubit"),
            Token::Bit => write!(f, "bit"),
            Token::Qreg => write!(f, "qreg"),
            Token::Creg => write!(f, "creg"),
            Token::Measure => write!(f, "measure"),
            Token::Reset => write!(f, "reset"),
            Token::Barrier => write!(f, "barrier"),
            Token::Pi => write!(f, "pi"),
            Token::FloatLiteral(v) => write!(f, "{v}"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Eq => write!(f, "="),
            Token::Arrow => write!(f, "->"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// A token with the line it starts on.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
}

/// Tokenize a QASM source string.
///
/// Newline tokens are consumed here for line accounting; the returned stream
/// contains no `Newline` entries.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, (usize, String)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    let mut line = 1usize;

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Newline) => line += 1,
            Ok(token) => tokens.push(SpannedToken { token, line }),
            Err(()) => {
                let slice = &source[lexer.span()];
                // Block comments may span lines; recount from the offset.
                let line = source[..lexer.span().start]
                    .bytes()
                    .filter(|&b| b == b'\n')
                    .count()
                    + 1;
                return Err((line, format!("invalid token: '{slice}'")));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize("OPENQASM 2.0;").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token, Token::OpenQasm);
        assert!(matches!(tokens[1].token, Token::FloatLiteral(v) if (v - 2.0).abs() < 0.001));
        assert_eq!(tokens[2].token, Token::Semicolon);
    }

    #[test]
    fn test_both_declaration_styles() {
        let tokens = tokenize("qreg q[2]; qubit[2] r;").unwrap();
        assert_eq!(tokens[0].token, Token::Qreg);
        assert_eq!(tokens[6].token, Token::Qubit);
    }

    #[test]
    fn test_line_tracking() {
        let tokens = tokenize("qreg q[1];\nh q[0];\n").unwrap();
        assert_eq!(tokens[0].line, 1);
        let h = tokens
            .iter()
            .find(|t| matches!(&t.token, Token::Identifier(s) if s == "h"))
            .unwrap();
        assert_eq!(h.line, 2);
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = tokenize("// comment\nqreg q[1]; /* block */ creg c[1];").unwrap();
        assert_eq!(tokens[0].token, Token::Qreg);
        assert!(tokens.iter().any(|t| t.token == Token::Creg));
    }

    #[test]
    fn test_parameterized_call() {
        let tokens = tokenize("rx(pi/2) q[0];").unwrap();
        assert!(matches!(tokens[0].token, Token::Identifier(ref s) if s == "rx"));
        assert_eq!(tokens[1].token, Token::LParen);
        assert_eq!(tokens[2].token, Token::Pi);
        assert_eq!(tokens[3].token, Token::Slash);
    }

    #[test]
    fn test_invalid_token() {
        let err = tokenize("qreg q[1];\n$bad").unwrap_err();
        assert_eq!(err.0, 2);
    }
}
