//! Tokenizer for the sandbox script language.
//!
//! Produces a flat token vector. Each token remembers whether a line break
//! preceded it so the parser can terminate statements without semicolons.

use crate::script::error::ScriptError;

/// Punctuators ordered longest first so greedy matching picks `===` over `==`.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "**=", "...", "=>", "==", "!=", "<=", ">=", "&&", "||", "??", "++", "--", "+=",
    "-=", "*=", "/=", "%=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", ".", ":",
    "?", "+", "-", "*", "/", "%", "<", ">", "=", "!", "&", "|", "^", "~",
];

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Text(String),
    /// Raw source of a `${...}` substitution, parsed later as an expression.
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Template(Vec<TemplatePart>),
    Ident(String),
    Punct(&'static str),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub newline_before: bool,
}

impl Token {
    /// Source-like rendering used in "Unexpected token" messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Number(n) => crate::script::value::format_number(*n),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Template(_) => "template string".to_string(),
            TokenKind::Ident(name) => name.clone(),
            TokenKind::Punct(p) => (*p).to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }

    pub fn is_punct(&self, p: &str) -> bool {
        matches!(self.kind, TokenKind::Punct(q) if q == p)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(n) if n == name)
    }
}

fn invalid_token() -> ScriptError {
    ScriptError::syntax("Invalid or unexpected token")
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut newline_before = false;

    while pos < chars.len() {
        let c = chars[pos];

        if c == '\n' {
            newline_before = true;
            pos += 1;
            continue;
        }
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // Comments
        if c == '/' && chars.get(pos + 1) == Some(&'/') {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }
        if c == '/' && chars.get(pos + 1) == Some(&'*') {
            pos += 2;
            loop {
                match chars.get(pos) {
                    None => return Err(invalid_token()),
                    Some('*') if chars.get(pos + 1) == Some(&'/') => {
                        pos += 2;
                        break;
                    }
                    Some('\n') => {
                        newline_before = true;
                        pos += 1;
                    }
                    Some(_) => pos += 1,
                }
            }
            continue;
        }

        let kind = if c.is_ascii_digit()
            || (c == '.' && chars.get(pos + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            let (n, next) = lex_number(&chars, pos)?;
            pos = next;
            TokenKind::Number(n)
        } else if c == '"' || c == '\'' {
            let (s, next) = lex_string(&chars, pos)?;
            pos = next;
            TokenKind::Str(s)
        } else if c == '`' {
            let (parts, next) = lex_template(&chars, pos)?;
            pos = next;
            TokenKind::Template(parts)
        } else if is_ident_start(c) {
            let start = pos;
            while pos < chars.len() && is_ident_part(chars[pos]) {
                pos += 1;
            }
            TokenKind::Ident(chars[start..pos].iter().collect())
        } else {
            let punct = PUNCTUATORS
                .iter()
                .find(|p| {
                    p.chars()
                        .enumerate()
                        .all(|(i, pc)| chars.get(pos + i) == Some(&pc))
                })
                .ok_or_else(invalid_token)?;
            pos += punct.chars().count();
            TokenKind::Punct(punct)
        };

        tokens.push(Token {
            kind,
            newline_before,
        });
        newline_before = false;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        newline_before: true,
    });
    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), ScriptError> {
    let mut pos = start;

    if chars[pos] == '0' && matches!(chars.get(pos + 1), Some('x') | Some('X')) {
        pos += 2;
        let digits_start = pos;
        while pos < chars.len() && chars[pos].is_ascii_hexdigit() {
            pos += 1;
        }
        let digits: String = chars[digits_start..pos].iter().collect();
        let n = i64::from_str_radix(&digits, 16).map_err(|_| invalid_token())?;
        return Ok((n as f64, pos));
    }

    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    if chars.get(pos) == Some(&'.') {
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if matches!(chars.get(pos), Some('e') | Some('E')) {
        let mut exp = pos + 1;
        if matches!(chars.get(exp), Some('+') | Some('-')) {
            exp += 1;
        }
        if chars.get(exp).is_some_and(|d| d.is_ascii_digit()) {
            pos = exp;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    // `5abc` is not a number followed by an identifier
    if chars.get(pos).is_some_and(|&c| is_ident_start(c)) {
        return Err(invalid_token());
    }

    let text: String = chars[start..pos].iter().collect();
    let n = text.parse::<f64>().map_err(|_| invalid_token())?;
    Ok((n, pos))
}

fn lex_escape(chars: &[char], pos: usize, out: &mut String) -> Result<usize, ScriptError> {
    let c = *chars.get(pos).ok_or_else(invalid_token)?;
    match c {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        '0' => out.push('\0'),
        'b' => out.push('\u{8}'),
        'u' => {
            let hex: String = chars.get(pos + 1..pos + 5).ok_or_else(invalid_token)?.iter().collect();
            let code = u32::from_str_radix(&hex, 16).map_err(|_| invalid_token())?;
            out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            return Ok(pos + 5);
        }
        // Line continuation
        '\n' => {}
        other => out.push(other),
    }
    Ok(pos + 1)
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), ScriptError> {
    let quote = chars[start];
    let mut pos = start + 1;
    let mut out = String::new();

    loop {
        match chars.get(pos) {
            None | Some('\n') => return Err(invalid_token()),
            Some('\\') => pos = lex_escape(chars, pos + 1, &mut out)?,
            Some(&c) if c == quote => return Ok((out, pos + 1)),
            Some(&c) => {
                out.push(c);
                pos += 1;
            }
        }
    }
}

fn lex_template(chars: &[char], start: usize) -> Result<(Vec<TemplatePart>, usize), ScriptError> {
    let mut pos = start + 1;
    let mut parts = Vec::new();
    let mut text = String::new();

    loop {
        match chars.get(pos) {
            None => return Err(ScriptError::syntax("Unterminated template literal")),
            Some('`') => {
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(text));
                }
                return Ok((parts, pos + 1));
            }
            Some('\\') => pos = lex_escape(chars, pos + 1, &mut text)?,
            Some('$') if chars.get(pos + 1) == Some(&'{') => {
                if !text.is_empty() {
                    parts.push(TemplatePart::Text(std::mem::take(&mut text)));
                }
                pos += 2;
                let expr_start = pos;
                let mut depth = 0usize;
                loop {
                    match chars.get(pos) {
                        None => return Err(ScriptError::syntax("Unterminated template literal")),
                        Some('{') => depth += 1,
                        Some('}') if depth == 0 => break,
                        Some('}') => depth -= 1,
                        Some(_) => {}
                    }
                    pos += 1;
                }
                parts.push(TemplatePart::Expr(chars[expr_start..pos].iter().collect()));
                pos += 1;
            }
            Some(&c) => {
                text.push(c);
                pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_greedy_punctuators() {
        assert_eq!(
            kinds("a === b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Punct("==="),
                TokenKind::Ident("b".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_newline_flag() {
        let tokens = tokenize("a\nb").unwrap();
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(kinds(r#""a\nb""#)[0], TokenKind::Str("a\nb".into()));
        assert_eq!(kinds("'it\\'s'")[0], TokenKind::Str("it's".into()));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("'abc").unwrap_err();
        assert_eq!(err.message, "Invalid or unexpected token");
    }

    #[test]
    fn test_template_parts() {
        assert_eq!(
            kinds("`x = ${x + 1}!`")[0],
            TokenKind::Template(vec![
                TemplatePart::Text("x = ".into()),
                TemplatePart::Expr("x + 1".into()),
                TemplatePart::Text("!".into()),
            ])
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("1 // one\n/* two */ 2"),
            vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unknown_character() {
        assert!(tokenize("a # b").is_err());
    }
}
