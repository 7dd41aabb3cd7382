//! Lexer for the NooCrush language

use crate::diagnostics::{codes, Diagnostic, Span};
use crate::parser::span::SourceFile;
use logos::Logos;

/// One piece of a back-quoted template string: either literal text or the
/// raw source of a `${...}` interpolation span, kept unparsed for the
/// parser to re-lex.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateFragment {
    Text(String),
    Expr(String),
}

/// Token types for NooCrush
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Keywords
    #[token("let")]
    Let,
    #[token("mut")]
    Mut,
    #[token("const")]
    Const,
    #[token("fn")]
    Fn,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("struct")]
    Struct,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("while")]
    While,
    #[token("loop")]
    Loop,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    NumberLit(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#, unescape_string)]
    StringLit(String),

    #[regex(r"`[^`]*`", template_fragments)]
    TemplateLit(Vec<TemplateFragment>),

    // Identifiers (also covers the `_` wildcard)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    #[token("..")]
    DotDot,
    #[token("..=")]
    DotDotEq,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token(".")]
    Dot,

    // End of input
    Eof,
}

/// A token with its span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Decode escape sequences in a double-quoted string literal.
/// Returns `None` (a lex error) on an unknown escape.
fn unescape_string(lex: &mut logos::Lexer<TokenKind>) -> Option<String> {
    let raw = lex.slice();
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            _ => return None,
        }
    }
    Some(out)
}

/// Split a back-quoted template literal into alternating text and `${...}`
/// expression fragments. Interpolation spans are brace-nesting aware; an
/// unterminated `${` is a lex error.
fn template_fragments(lex: &mut logos::Lexer<TokenKind>) -> Option<Vec<TemplateFragment>> {
    let raw = lex.slice();
    let inner = &raw[1..raw.len() - 1];
    let bytes = inner.as_bytes();

    let mut fragments = Vec::new();
    let mut seg_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            if seg_start < i {
                fragments.push(TemplateFragment::Text(inner[seg_start..i].to_string()));
            }
            let mut depth = 1;
            let mut j = i + 2;
            while j < bytes.len() && depth > 0 {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            if depth != 0 {
                return None;
            }
            fragments.push(TemplateFragment::Expr(inner[i + 2..j - 1].to_string()));
            seg_start = j;
            i = j;
        } else {
            i += 1;
        }
    }
    if seg_start < inner.len() {
        fragments.push(TemplateFragment::Text(inner[seg_start..].to_string()));
    }
    Some(fragments)
}

/// Tokenize an entire source unit, appending a terminating `Eof` token.
///
/// Lexing is total and deterministic; the first unrecognized character
/// aborts with a diagnostic carrying its position.
pub fn tokenize(source: &SourceFile) -> Result<Vec<Token>, Diagnostic> {
    let mut lexer = TokenKind::lexer(source.content());
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = source.span(range.start, range.end);
        match result {
            Ok(kind) => tokens.push(Token::new(kind, span)),
            Err(()) => {
                return Err(Diagnostic::error(codes::LEX_UNEXPECTED_CHAR)
                    .message(format!("unexpected character: {:?}", lexer.slice()))
                    .span(span)
                    .build())
            }
        }
    }

    let end = source.content().len();
    tokens.push(Token::new(TokenKind::Eof, source.span(end, end)));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        let source_file = SourceFile::new("test.nc", source);
        let mut tokens = tokenize(&source_file).expect("lex failed");
        assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::Eof));
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords() {
        assert_eq!(
            lex("let mut const fn async await struct match"),
            vec![
                TokenKind::Let,
                TokenKind::Mut,
                TokenKind::Const,
                TokenKind::Fn,
                TokenKind::Async,
                TokenKind::Await,
                TokenKind::Struct,
                TokenKind::Match,
            ]
        );
    }

    #[test]
    fn number_literals() {
        assert_eq!(
            lex("42 3.14"),
            vec![TokenKind::NumberLit(42.0), TokenKind::NumberLit(3.14)]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            lex(r#""a\nb\"c""#),
            vec![TokenKind::StringLit("a\nb\"c".to_string())]
        );
    }

    #[test]
    fn unknown_escape_is_an_error() {
        let source_file = SourceFile::new("test.nc", r#""\q""#);
        assert!(tokenize(&source_file).is_err());
    }

    #[test]
    fn operators_longest_match() {
        assert_eq!(
            lex("== = => -> .. ..= :: : <= <"),
            vec![
                TokenKind::EqEq,
                TokenKind::Eq,
                TokenKind::FatArrow,
                TokenKind::Arrow,
                TokenKind::DotDot,
                TokenKind::DotDotEq,
                TokenKind::ColonColon,
                TokenKind::Colon,
                TokenKind::LtEq,
                TokenKind::Lt,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            lex("1 // ignored to end of line\n2"),
            vec![TokenKind::NumberLit(1.0), TokenKind::NumberLit(2.0)]
        );
    }

    #[test]
    fn template_string_fragments() {
        assert_eq!(
            lex("`x is ${x + 1}!`"),
            vec![TokenKind::TemplateLit(vec![
                TemplateFragment::Text("x is ".to_string()),
                TemplateFragment::Expr("x + 1".to_string()),
                TemplateFragment::Text("!".to_string()),
            ])]
        );
    }

    #[test]
    fn template_interpolation_brace_nesting() {
        assert_eq!(
            lex("`${ if a { 1 } else { 2 } }`"),
            vec![TokenKind::TemplateLit(vec![TemplateFragment::Expr(
                " if a { 1 } else { 2 } ".to_string()
            )])]
        );
    }

    #[test]
    fn unexpected_character_reports_position() {
        let source_file = SourceFile::new("test.nc", "let @ = 1;");
        let err = tokenize(&source_file).unwrap_err();
        assert_eq!(err.span.line, 1);
        assert_eq!(err.span.col, 5);
    }

    #[test]
    fn relexing_reconstructed_lexemes_reproduces_the_kinds() {
        let source = "
            // comment lines disappear on reconstruction
            struct Point { mut x: Number }
            let xs = [n * n for n in 1..=3 if n != 2];
            print(`got ${xs}`);
        ";
        let source_file = SourceFile::new("test.nc", source);
        let tokens = tokenize(&source_file).unwrap();

        let lexemes: Vec<&str> = tokens[..tokens.len() - 1]
            .iter()
            .map(|t| &source[t.span.start..t.span.end])
            .collect();
        let reconstructed = lexemes.join(" ");

        let kinds: Vec<TokenKind> = tokens[..tokens.len() - 1]
            .iter()
            .map(|t| t.kind.clone())
            .collect();
        assert_eq!(lex(&reconstructed), kinds);
    }

    #[test]
    fn lexing_is_deterministic() {
        let source = "let mut total = 0; total = total + 1; `${total}..=3`";
        let first = tokenize(&SourceFile::new("test.nc", source)).unwrap();
        let second = tokenize(&SourceFile::new("test.nc", source)).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.span, b.span);
        }
    }

    #[test]
    fn eof_token_is_always_last() {
        let source_file = SourceFile::new("test.nc", "");
        let tokens = tokenize(&source_file).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
