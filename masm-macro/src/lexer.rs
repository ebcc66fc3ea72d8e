use masm_common::{MasmError, SourceLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,     // add, loop, foo
    Directive,      // .macro, .end_macro, .word
    Register,       // $t0, $f2, $8 (also SPIM-style $param)
    MacroParameter, // %a
    Integer,        // 42, 0x1F
    StringLiteral,  // "text"
    CharLiteral,    // 'c'
    Comma,          // ,
    Colon,          // :
    LeftParen,      // (
    RightParen,     // )
    Plus,           // +
    Minus,          // -
    Operator,       // any other punctuation
}

/// A token of one source line. `column` is 1-based, `offset` is the byte
/// offset of the token's first character within the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

pub type TokenList = Vec<Token>;

pub struct Lexer<'a> {
    filename: &'a str,
    input: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(filename: &'a str, source_line: &str, line: usize) -> Self {
        Self {
            filename,
            input: source_line.chars().collect(),
            current: 0,
            line,
            column: 1,
            offset: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<TokenList, MasmError> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            if let Some(token) = self.scan_token()? {
                tokens.push(token);
            }
        }

        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Option<Token>, MasmError> {
        let start_column = self.column;
        let start_offset = self.offset;
        let start = self.current;

        let ch = self.advance();

        let kind = match ch {
            ' ' | '\t' | '\r' | '\n' => return Ok(None),
            '#' => {
                // Comment runs to the end of the line
                while !self.is_at_end() {
                    self.advance();
                }
                return Ok(None);
            }
            '"' => {
                self.scan_quoted('"', start_column)?;
                TokenKind::StringLiteral
            }
            '\'' => {
                self.scan_quoted('\'', start_column)?;
                TokenKind::CharLiteral
            }
            '.' if is_ident_start(self.peek()) => {
                self.scan_ident_tail();
                TokenKind::Directive
            }
            '$' if is_ident_char(self.peek()) => {
                self.scan_ident_tail();
                TokenKind::Register
            }
            '%' if is_ident_char(self.peek()) => {
                self.scan_ident_tail();
                TokenKind::MacroParameter
            }
            c if c.is_ascii_digit() => {
                while is_ident_char(self.peek()) {
                    self.advance();
                }
                TokenKind::Integer
            }
            c if is_ident_start(c) => {
                self.scan_ident_tail();
                TokenKind::Identifier
            }
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            _ => TokenKind::Operator,
        };

        Ok(Some(Token {
            kind,
            text: self.get_text(start),
            line: self.line,
            column: start_column,
            offset: start_offset,
        }))
    }

    fn scan_quoted(&mut self, quote: char, start_column: usize) -> Result<(), MasmError> {
        while !self.is_at_end() {
            match self.advance() {
                '\\' => {
                    if !self.is_at_end() {
                        self.advance();
                    }
                }
                c if c == quote => return Ok(()),
                _ => {}
            }
        }

        Err(MasmError::LexError {
            location: SourceLocation::new(self.filename, self.line as u32, start_column as u32),
            message: if quote == '"' {
                "Unterminated string literal".to_string()
            } else {
                "Unterminated character literal".to_string()
            },
        })
    }

    fn scan_ident_tail(&mut self) {
        while is_ident_char(self.peek()) {
            self.advance();
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.input[self.current];
        self.current += 1;
        self.column += 1;
        self.offset += ch.len_utf8();
        ch
    }

    fn peek(&self) -> char {
        self.input.get(self.current).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.input.len()
    }

    fn get_text(&self, start: usize) -> String {
        self.input[start..self.current].iter().collect()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Lex a single source line
pub fn tokenize_line(
    filename: &str,
    source_line: &str,
    line: usize,
) -> Result<TokenList, MasmError> {
    Lexer::new(filename, source_line, line).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize_line("test.asm", line, 1)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(line: &str) -> Vec<String> {
        tokenize_line("test.asm", line, 1)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_instruction_with_parameters() {
        assert_eq!(texts("add %a, %a, %b"), vec!["add", "%a", ",", "%a", ",", "%b"]);
        assert_eq!(
            kinds("add %a, $t0"),
            vec![
                TokenKind::Identifier,
                TokenKind::MacroParameter,
                TokenKind::Comma,
                TokenKind::Register,
            ]
        );
    }

    #[test]
    fn test_offsets_and_columns() {
        let tokens = tokenize_line("test.asm", "  lw $t0, 4($sp)", 9).unwrap();
        let sp = tokens.iter().find(|t| t.text == "$sp").unwrap();
        assert_eq!(sp.offset, 12);
        assert_eq!(sp.column, 13);
        assert_eq!(sp.line, 9);
    }

    #[test]
    fn test_offsets_are_bytes() {
        let tokens = tokenize_line("test.asm", ".asciiz \"h\u{e9}\" %x", 1).unwrap();
        let param = tokens.last().unwrap();
        assert_eq!(param.text, "%x");
        assert_eq!(param.column, 14);
        assert_eq!(param.offset, 14);
    }

    #[test]
    fn test_label_and_directive() {
        assert_eq!(
            kinds("loop: .end_macro"),
            vec![TokenKind::Identifier, TokenKind::Colon, TokenKind::Directive]
        );
    }

    #[test]
    fn test_comment_is_dropped() {
        assert_eq!(texts("nop # %a is not a token here"), vec!["nop"]);
    }

    #[test]
    fn test_string_literal_keeps_escapes() {
        assert_eq!(texts(r#".asciiz "a\"b" "#), vec![".asciiz", r#""a\"b""#]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize_line("test.asm", ".asciiz \"oops", 4).unwrap_err();
        assert!(matches!(
            err,
            MasmError::LexError { ref location, .. } if location.line == 4 && location.column == 9
        ));
    }

    #[test]
    fn test_lone_sigils_are_operators() {
        assert_eq!(kinds("% $"), vec![TokenKind::Operator, TokenKind::Operator]);
    }
}
