//! First pass over a program: collect `.macro` blocks into a pool, then
//! replace macro calls with their expansions.

use crate::counter::InvocationCounter;
use crate::expander::{CallArguments, MacroExpander};
use crate::lexer::{Token, TokenKind};
use crate::macro_def::MacroBuilder;
use crate::pool::MacroPool;
use crate::program::SourceProgram;
use log::debug;
use masm_common::{Diagnostic, ErrorReporter, MasmError, SourceLocation};
use std::ops::RangeInclusive;
use std::sync::Arc;

const MACRO_DIRECTIVE: &str = ".macro";
const END_MACRO_DIRECTIVE: &str = ".end_macro";

/// Macros found in one program and the lines their definitions occupy
#[derive(Debug, Default)]
pub struct ScanResult {
    pub pool: MacroPool,
    pub definition_lines: Vec<RangeInclusive<usize>>,
}

impl ScanResult {
    pub fn is_definition_line(&self, line: usize) -> bool {
        self.definition_lines.iter().any(|r| r.contains(&line))
    }

    /// True for the `.macro` line that opens a definition
    pub fn is_definition_header(&self, line: usize) -> bool {
        self.definition_lines.iter().any(|r| *r.start() == line)
    }
}

/// A macro call found on a source line
#[derive(Debug, Clone, PartialEq)]
pub struct MacroCall {
    pub labels: Vec<String>,
    pub name: String,
    pub arguments: CallArguments,
    pub location: SourceLocation,
}

/// Collect every `.macro` ... `.end_macro` block of `program`.
///
/// Redefining a macro with the same name and parameter count replaces the
/// earlier definition and is reported as a warning.
pub fn scan_definitions(
    program: &Arc<dyn SourceProgram>,
    expander: &MacroExpander,
    reporter: &mut ErrorReporter,
) -> Result<ScanResult, MasmError> {
    let mut result = ScanResult::default();
    let mut current: Option<MacroBuilder> = None;

    for line in 1..=program.line_count() {
        let tokens = program.tokens(line).unwrap_or(&[]);
        let (labels, rest) = split_labels(tokens);
        let directive = rest.first().filter(|t| t.kind == TokenKind::Directive);

        match directive.map(|t| t.text.to_ascii_lowercase()).as_deref() {
            Some(MACRO_DIRECTIVE) => {
                if let Some(open) = &current {
                    return Err(syntax_error(
                        program.as_ref(),
                        &rest[0],
                        format!(
                            "Nested macro definition inside '{}' is not supported",
                            open.name()
                        ),
                    ));
                }
                let mut builder = parse_header(program, rest, expander)?;
                builder.set_from_line(line, line);
                current = Some(builder);
            }
            Some(END_MACRO_DIRECTIVE) => {
                let Some(mut builder) = current.take() else {
                    return Err(syntax_error(
                        program.as_ref(),
                        &rest[0],
                        ".end_macro without matching .macro".to_string(),
                    ));
                };
                for label in labels {
                    builder.add_label(label);
                }
                builder.set_to_line(line, line);
                let def = builder.ready_for_commit();
                let signature = def.signature();
                result.definition_lines.push(def.range().from_line..=line);

                if result.pool.commit(def).is_some() {
                    reporter.warning(
                        format!("Macro '{}' redefined", signature),
                        SourceLocation::line_start(program.name(), line as u32),
                    );
                }
            }
            _ => {
                if let Some(builder) = current.as_mut() {
                    for label in labels {
                        builder.add_label(label);
                    }
                }
            }
        }
    }

    if let Some(builder) = current {
        return Err(MasmError::MacroSyntax {
            location: SourceLocation::line_start(program.name(), builder.range().from_line as u32),
            message: format!("Macro '{}' is missing .end_macro", builder.name()),
        });
    }

    debug!(
        "Found {} macro definition(s) in '{}'",
        result.pool.len(),
        program.name()
    );
    Ok(result)
}

/// Expand `program`: definition blocks are dropped and every call of a
/// pooled macro is replaced by its substituted body. Expanded lines are not
/// scanned again for further calls.
pub fn expand_program(
    program: &dyn SourceProgram,
    scan: &ScanResult,
    expander: &MacroExpander,
    counter: &InvocationCounter,
    reporter: &mut ErrorReporter,
) -> Result<String, MasmError> {
    let mut output = String::new();

    for line in 1..=program.line_count() {
        let source = program.source_line(line).unwrap_or("");
        let tokens = program.tokens(line).unwrap_or(&[]);

        if scan.is_definition_line(line) {
            // Labels in front of `.macro` still name this spot in the program
            if scan.is_definition_header(line) {
                push_labels(&mut output, split_labels(tokens).0.as_slice());
            }
            continue;
        }

        let call = parse_call(program.name(), source, tokens)
            .filter(|call| scan.pool.contains_name(&call.name));
        let Some(call) = call else {
            output.push_str(source);
            output.push('\n');
            continue;
        };

        let Some(def) = scan.pool.lookup(&call.name, call.arguments.arity()) else {
            let message = format!(
                "No macro '{}' takes {} argument(s)",
                call.name,
                call.arguments.arity()
            );
            let arities = scan.pool.arities(&call.name);
            reporter.report(
                Diagnostic::error(message, call.location.clone())
                    .with_note(format!("defined with {:?} parameter(s)", arities)),
            );
            output.push_str(source);
            output.push('\n');
            continue;
        };

        let invocation = counter.next();
        push_labels(&mut output, call.labels.as_slice());
        for expanded in expander.expand(def, &call.arguments, invocation, reporter)? {
            output.push_str(&expanded);
            output.push('\n');
        }
    }

    Ok(output)
}

/// Recognise `[label:] name [args]` where args are comma separated and may
/// be wrapped in one pair of parentheses.
pub fn parse_call(filename: &str, source: &str, tokens: &[Token]) -> Option<MacroCall> {
    let (labels, rest) = split_labels(tokens);
    let (head, args) = rest.split_first()?;
    if head.kind != TokenKind::Identifier {
        return None;
    }

    let args = strip_parens(args);
    let arguments = if args.is_empty() {
        Vec::new()
    } else {
        split_top_level(args)
            .into_iter()
            .map(|group| token_text(source, group))
            .collect()
    };

    Some(MacroCall {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        name: head.text.clone(),
        arguments: CallArguments::new(&head.text, arguments),
        location: SourceLocation::new(filename, head.line as u32, head.column as u32),
    })
}

fn parse_header(
    program: &Arc<dyn SourceProgram>,
    tokens: &[Token],
    expander: &MacroExpander,
) -> Result<MacroBuilder, MasmError> {
    let directive = &tokens[0];
    let name = match tokens.get(1) {
        Some(token) if token.kind == TokenKind::Identifier => token,
        Some(token) => {
            return Err(syntax_error(
                program.as_ref(),
                token,
                format!("Invalid macro name '{}'", token.text),
            ))
        }
        None => {
            return Err(syntax_error(
                program.as_ref(),
                directive,
                "Macro name expected after .macro".to_string(),
            ))
        }
    };

    let mut builder = MacroBuilder::new(&name.text, Arc::clone(program));
    for token in &tokens[2..] {
        match token.kind {
            TokenKind::Comma | TokenKind::LeftParen | TokenKind::RightParen => {}
            _ if expander.is_parameter(&token.text) => {
                builder.add_parameter(&token.text);
            }
            _ => {
                return Err(syntax_error(
                    program.as_ref(),
                    token,
                    format!("Invalid macro parameter '{}'", token.text),
                ))
            }
        }
    }

    Ok(builder)
}

fn push_labels<S: AsRef<str>>(output: &mut String, labels: &[S]) {
    for label in labels {
        output.push_str(label.as_ref());
        output.push_str(":\n");
    }
}

/// Split leading `name:` label definitions off a token list
fn split_labels(tokens: &[Token]) -> (Vec<&str>, &[Token]) {
    let mut labels = Vec::new();
    let mut rest = tokens;
    while let [name, colon, tail @ ..] = rest {
        if name.kind != TokenKind::Identifier || colon.kind != TokenKind::Colon {
            break;
        }
        labels.push(name.text.as_str());
        rest = tail;
    }
    (labels, rest)
}

/// Drop one pair of parentheses enclosing the whole argument list
fn strip_parens(tokens: &[Token]) -> &[Token] {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return tokens;
    };
    if first.kind != TokenKind::LeftParen || last.kind != TokenKind::RightParen {
        return tokens;
    }

    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != tokens.len() - 1 {
                    return tokens;
                }
            }
            _ => {}
        }
    }
    &tokens[1..tokens.len() - 1]
}

fn split_top_level(tokens: &[Token]) -> Vec<&[Token]> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                groups.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&tokens[start..]);
    groups
}

/// Source text covered by a run of tokens, spacing kept as written
fn token_text(source: &str, group: &[Token]) -> String {
    match (group.first(), group.last()) {
        (Some(first), Some(last)) => source
            .get(first.offset..last.offset + last.text.len())
            .map(str::to_string)
            .unwrap_or_else(|| group.iter().map(|t| t.text.as_str()).collect()),
        _ => String::new(),
    }
}

fn syntax_error(program: &dyn SourceProgram, token: &Token, message: String) -> MasmError {
    MasmError::MacroSyntax {
        location: SourceLocation::new(program.name(), token.line as u32, token.column as u32),
        message,
    }
}
