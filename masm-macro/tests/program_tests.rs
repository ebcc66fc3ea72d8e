use indoc::indoc;
use masm_common::{ErrorReporter, MasmError, Severity};
use masm_macro::{
    expand_program, expand_source, scan_definitions, ExpansionOptions, InvocationCounter,
    MacroExpander, Program, SourceProgram,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const PROGRAM: &str = indoc! {"
    .macro print_int (%x)
    li $v0, 1
    add $a0, $zero, %x
    syscall
    .end_macro

    .macro countdown %reg, %n
    li %reg, %n
    again: addi %reg, %reg, -1
    bnez %reg, again
    .end_macro

    .text
    main: countdown $t0, 10
    print_int ($t0)
    countdown $t1, 3
    li $v0, 10
    syscall
"};

fn expand(name: &str, source: &str, reporter: &mut ErrorReporter) -> String {
    expand_source(name, source, ExpansionOptions::default(), reporter).unwrap()
}

#[test]
fn test_expand_program() {
    let mut reporter = ErrorReporter::new();
    let output = expand("main.asm", PROGRAM, &mut reporter);

    let expected = vec![
        "",
        "",
        ".text",
        "main:",
        "li $t0, 10",
        "again_M0: addi $t0, $t0, -1",
        "bnez $t0, again_M0",
        "li $v0, 1",
        "add $a0, $zero, $t0",
        "syscall",
        "li $t1, 3",
        "again_M2: addi $t1, $t1, -1",
        "bnez $t1, again_M2",
        "li $v0, 10",
        "syscall",
    ];
    assert_eq!(output.lines().collect::<Vec<_>>(), expected);
    assert!(output.ends_with("syscall\n"));
    assert!(!reporter.has_errors());
}

#[test]
fn test_first_invocation_option() {
    let mut reporter = ErrorReporter::new();
    let options = ExpansionOptions {
        first_invocation: 40,
        ..ExpansionOptions::default()
    };
    let output = expand_source("main.asm", PROGRAM, options, &mut reporter).unwrap();

    assert!(output.contains("again_M40:"));
    assert!(output.contains("again_M42:"));
    assert!(!output.contains("again_M41:"));
}

#[test]
fn test_counter_spans_programs() {
    let expander = MacroExpander::default();
    let counter = InvocationCounter::new();
    let mut reporter = ErrorReporter::new();

    let mut outputs = Vec::new();
    for name in ["a.asm", "b.asm"] {
        let program: Arc<dyn SourceProgram> =
            Arc::new(Program::from_source(name, PROGRAM).unwrap());
        let scan = scan_definitions(&program, &expander, &mut reporter).unwrap();
        let output =
            expand_program(program.as_ref(), &scan, &expander, &counter, &mut reporter).unwrap();
        outputs.push(output);
    }

    assert!(outputs[0].contains("again_M0:"));
    assert!(outputs[1].contains("again_M3:"));
    assert!(outputs[1].contains("again_M5:"));
    assert_eq!(counter.peek(), 6);
}

#[test]
fn test_wrong_arity_is_reported_and_kept() {
    let source = indoc! {"
        .macro pair %a, %b
        move %a, %b
        .end_macro
        pair $t0
    "};
    let mut reporter = ErrorReporter::new();
    let output = expand("main.asm", source, &mut reporter);

    assert_eq!(output, "pair $t0\n");
    assert_eq!(reporter.error_count(), 1);
    let diag = &reporter.diagnostics()[0];
    assert_eq!(diag.message, "No macro 'pair' takes 1 argument(s)");
    assert_eq!(diag.location.line, 4);
    assert_eq!(diag.notes, vec!["defined with [2] parameter(s)".to_string()]);
}

#[test]
fn test_unknown_parameter_points_at_definition() {
    let source = indoc! {"
        nop
        .macro m %a
        move %a, %b
        .end_macro
        m $t0
    "};
    let mut reporter = ErrorReporter::new();
    let output = expand("main.asm", source, &mut reporter);

    assert_eq!(output, "nop\nmove $t0, %b\n");
    assert_eq!(reporter.error_count(), 1);
    let diag = &reporter.diagnostics()[0];
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.location.line, 3);
    assert_eq!(diag.location.column, 10);
}

#[test]
fn test_spim_parameters_can_be_disabled() {
    let source = indoc! {"
        .macro m %a
        move %a, $b
        .end_macro
        m $t0
    "};

    let mut reporter = ErrorReporter::new();
    expand("main.asm", source, &mut reporter);
    assert_eq!(reporter.error_count(), 1);

    let options = ExpansionOptions {
        accept_spim_parameters: false,
        ..ExpansionOptions::default()
    };
    let mut reporter = ErrorReporter::new();
    let output = expand_source("main.asm", source, options, &mut reporter).unwrap();
    assert_eq!(output, "move $t0, $b\n");
    assert!(!reporter.has_errors());
}

#[test]
fn test_unterminated_definition_is_hard_error() {
    let mut reporter = ErrorReporter::new();
    let options = ExpansionOptions::default();
    let err = expand_source("main.asm", ".macro m\nnop\n", options, &mut reporter).unwrap_err();
    assert!(matches!(err, MasmError::MacroSyntax { .. }));
}
