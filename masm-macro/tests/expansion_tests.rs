use indoc::indoc;
use masm_common::{ErrorReporter, SourceLocation};
use masm_macro::{
    is_macro_parameter, CallArguments, MacroBuilder, MacroDefinition, MacroExpander,
    MipsRegisters, Program, SourceProgram,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const FOO: &str = indoc! {"
    .macro foo %a, %b
    add %a, %a, %b
    loop:
    add %c, %a, %b
    beq %a, $zero, loop
    syscall
    .end_macro
"};

fn foo() -> MacroDefinition {
    let program: Arc<dyn SourceProgram> = Arc::new(Program::from_source("foo.asm", FOO).unwrap());
    let mut builder = MacroBuilder::new("foo", program);
    builder
        .add_parameter("%a")
        .add_parameter("%b")
        .add_label("loop")
        .set_from_line(1, 1)
        .set_to_line(7, 7);
    builder.ready_for_commit()
}

fn call(args: &[&str]) -> CallArguments {
    let mut slots = vec!["foo".to_string()];
    slots.extend(args.iter().map(|a| a.to_string()));
    CallArguments::from_slots(slots)
}

fn line(def: &MacroDefinition, n: usize, args: &CallArguments, counter: u64) -> String {
    let mut reporter = ErrorReporter::new();
    MacroExpander::default()
        .substitute_line(def, n, args, counter, &mut reporter)
        .unwrap()
}

#[test]
fn test_concrete_scenario() {
    let def = foo();
    let args = call(&["$t0", "$t1"]);

    assert_eq!(line(&def, 2, &args, 7), "add $t0, $t0, $t1");
    assert_eq!(line(&def, 3, &args, 7), "loop_M7:");
}

#[test]
fn test_unknown_parameter_scenario() {
    let def = foo();
    let mut reporter = ErrorReporter::new();

    let text = MacroExpander::default()
        .substitute_line(&def, 4, &call(&["$t0", "$t1"]), 7, &mut reporter)
        .unwrap();

    assert_eq!(text, "add %c, $t0, $t1");
    assert_eq!(reporter.diagnostics().len(), 1);
    assert_eq!(reporter.diagnostics()[0].location, SourceLocation::new("foo.asm", 4, 5));
}

#[test]
fn test_arguments_land_in_their_positions() {
    let def = foo();
    for (a, b) in [("$t0", "$t1"), ("$s3", "$a0"), ("$v0", "42")] {
        let args = call(&[a, b]);
        assert_eq!(line(&def, 2, &args, 1), format!("add {a}, {a}, {b}"));
    }
}

#[test]
fn test_counter_only_changes_label_suffix() {
    let def = foo();
    let args = call(&["$t0", "$t1"]);

    assert_eq!(line(&def, 5, &args, 1), "beq $t0, $zero, loop_M1");
    assert_eq!(line(&def, 5, &args, 99), "beq $t0, $zero, loop_M99");
    assert_eq!(line(&def, 2, &args, 1), line(&def, 2, &args, 99));
}

#[test]
fn test_distinct_counters_give_distinct_labels() {
    let def = foo();
    let args = call(&["$t0", "$t1"]);
    assert_ne!(line(&def, 3, &args, 1), line(&def, 3, &args, 2));
    assert_ne!(line(&def, 3, &args, 10), line(&def, 3, &args, 1));
}

#[test]
fn test_plain_lines_are_unchanged() {
    let def = foo();
    for (args, counter) in [(call(&["$t0", "$t1"]), 0), (call(&["1", "2"]), 500)] {
        assert_eq!(line(&def, 6, &args, counter), "syscall");
    }
}

#[test]
fn test_registers_never_parameters() {
    for reg in ["$t0", "$sp", "$ra", "$0", "$8", "$13", "$f0", "$f30"] {
        assert!(!is_macro_parameter(reg, true, &MipsRegisters), "{reg}");
    }
    for param in ["%a", "%reg", "%1"] {
        assert!(is_macro_parameter(param, false, &MipsRegisters), "{param}");
        assert!(is_macro_parameter(param, true, &MipsRegisters), "{param}");
    }
}

#[test]
fn test_spim_style_body() {
    let source = indoc! {"
        .macro inc($r)
        addi $r, $r, 1
        .end_macro
    "};
    let program: Arc<dyn SourceProgram> =
        Arc::new(Program::from_source("inc.asm", source).unwrap());
    let mut builder = MacroBuilder::new("inc", program);
    builder.add_parameter("$r").set_from_line(1, 1).set_to_line(3, 3);
    let def = builder.ready_for_commit();

    let args = CallArguments::new("inc", vec!["$t5".to_string()]);
    assert_eq!(line(&def, 2, &args, 0), "addi $t5, $t5, 1");
}
