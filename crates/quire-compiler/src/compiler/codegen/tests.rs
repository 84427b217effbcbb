//! Tests for the bytecode compiler.

use super::*;
use crate::ast::build::*;
use crate::ast::Position;
use crate::compiler::bytecode::{Bytecode, EntryPoint, Label, Slot};
use crate::error::{Diagnostic, Error, ErrorKind, InternalError};

fn compile_source(program: &Program) -> Result<Bytecode, Error> {
    Compiler::new().with_builtins(&Builtins::new()).compile(program)
}

fn compile_ok(statements: Vec<crate::ast::Statement>) -> Bytecode {
    compile_source(&program(statements)).expect("Compilation should succeed")
}

fn compile_err(statements: Vec<crate::ast::Statement>) -> Error {
    compile_source(&program(statements)).expect_err("Compilation should fail")
}

fn entry(op: RuntimeOp) -> Operand {
    Operand::Entry(StandardRuntime.lookup(op.name()).unwrap())
}

fn simple(opcode: OpCode) -> Instruction {
    Instruction::simple(opcode)
}

fn with(opcode: OpCode, operand: Operand) -> Instruction {
    Instruction::with_operand(opcode, operand)
}

fn int(n: i32) -> [Instruction; 2] {
    [with(OpCode::LoadInt, Operand::Int(n)), simple(OpCode::BoxInt)]
}

fn runtime(op: RuntimeOp) -> Instruction {
    with(OpCode::CallRuntime, entry(op))
}

fn load(slot: u16) -> Instruction {
    with(OpCode::LoadLocal, Operand::Local(Slot(slot)))
}

fn store(slot: u16) -> Instruction {
    with(OpCode::StoreLocal, Operand::Local(Slot(slot)))
}

fn jump_if_false(target: u32) -> Instruction {
    with(OpCode::JumpIfFalse, Operand::Jump(target))
}

fn jump(target: u32) -> Instruction {
    with(OpCode::Jump, Operand::Jump(target))
}

// ============================================================================
// Program and builtins
// ============================================================================

#[test]
fn test_compile_empty_program() {
    let bytecode = compile_ok(vec![]);
    assert_eq!(bytecode.instructions, vec![simple(OpCode::Return)]);
    assert_eq!(bytecode.local_count, 0);
}

#[test]
fn test_compiler_default_installs_standard_builtins() {
    let bytecode = Compiler::default().compile(&program(vec![])).unwrap();
    let mut expected = Vec::new();
    for index in 0..4u16 {
        expected.push(with(OpCode::LoadBuiltin, Operand::Builtin(index)));
        expected.push(store(index));
    }
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
    assert_eq!(bytecode.local_count, 4);
}

#[test]
fn test_builtins_are_resolvable() {
    let bytecode = Compiler::new()
        .compile(&program(vec![expr(call(ident("print"), vec![ident("true")]))]))
        .unwrap();
    // print is slot 0, true is slot 1
    assert!(bytecode.instructions.contains(&load(0)));
    assert!(bytecode.instructions.contains(&load(1)));
}

#[test]
fn test_var_shadows_builtin() {
    let bytecode = Compiler::new()
        .compile(&program(vec![var("print", num("1")), expr(ident("print"))]))
        .unwrap();
    let n = bytecode.len();
    assert_eq!(bytecode.instructions[n - 4], store(4));
    assert_eq!(bytecode.instructions[n - 3], load(4));
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_compile_number_literal() {
    let bytecode = compile_ok(vec![expr(num("42"))]);
    let mut expected = int(42).to_vec();
    expected.push(simple(OpCode::Pop));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
}

#[test]
fn test_number_out_of_range() {
    let err = compile_err(vec![expr(num("4294967296").at(3, 7))]);
    assert_eq!(
        err,
        Error::Compile(Diagnostic::new(
            Position::new(3, 7),
            ErrorKind::NumberFormat("4294967296".into())
        ))
    );
}

#[test]
fn test_signed_literal_rejected() {
    let err = compile_err(vec![expr(num("-5"))]);
    assert_eq!(err.kind(), Some(&ErrorKind::NumberFormat("-5".into())));
}

#[test]
fn test_binary_operators() {
    let cases = [
        ("+", RuntimeOp::Add),
        ("-", RuntimeOp::Sub),
        ("*", RuntimeOp::Mul),
        ("/", RuntimeOp::Div),
        ("%", RuntimeOp::Rem),
        ("<", RuntimeOp::Lt),
        ("==", RuntimeOp::Eq),
    ];
    for (operator, op) in cases {
        let bytecode = compile_ok(vec![expr(binary(num("1"), operator, num("2")))]);
        let mut expected = int(1).to_vec();
        expected.extend(int(2));
        expected.push(runtime(op));
        expected.push(simple(OpCode::Pop));
        expected.push(simple(OpCode::Return));
        assert_eq!(bytecode.instructions, expected, "operator {}", operator);
    }
}

#[test]
fn test_unknown_operator() {
    let err = compile_err(vec![expr(binary(num("1"), "^", num("2")).at(1, 3))]);
    assert_eq!(
        err,
        Error::Compile(Diagnostic::new(
            Position::new(1, 3),
            ErrorKind::UnknownOperator("^".into())
        ))
    );
}

#[test]
fn test_binary_evaluates_left_then_right() {
    let bytecode = compile_ok(vec![
        var("a", num("1")),
        var("b", num("2")),
        expr(binary(ident("a"), "-", ident("b"))),
    ]);
    let body = &bytecode.instructions[6..9];
    assert_eq!(body, &[load(0), load(1), runtime(RuntimeOp::Sub)]);
}

#[test]
fn test_compile_call() {
    let bytecode = compile_ok(vec![
        var("f", num("0")),
        expr(call(ident("f"), vec![num("1"), ident("f")])),
    ]);
    let mut expected = int(0).to_vec();
    expected.push(store(0));
    expected.push(load(0));
    expected.push(with(OpCode::NewArgs, Operand::Count(2)));
    expected.extend(int(1));
    expected.push(with(OpCode::StoreArg, Operand::Index(0)));
    expected.push(load(0));
    expected.push(with(OpCode::StoreArg, Operand::Index(1)));
    expected.push(runtime(RuntimeOp::Call));
    expected.push(simple(OpCode::Pop));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
}

#[test]
fn test_call_without_arguments() {
    let bytecode = compile_ok(vec![var("f", num("0")), expr(call(ident("f"), vec![]))]);
    assert_eq!(
        &bytecode.instructions[4..6],
        &[with(OpCode::NewArgs, Operand::Count(0)), runtime(RuntimeOp::Call)]
    );
}

#[test]
fn test_parentheses_pass_through() {
    let plain = compile_ok(vec![expr(binary(num("1"), "+", num("2")))]);
    let wrapped = compile_ok(vec![expr(parens(parens(binary(num("1"), "+", num("2")))))]);
    assert_eq!(plain, wrapped);
}

#[test]
fn test_unknown_identifier() {
    let err = compile_err(vec![expr(ident("nope").at(2, 1))]);
    assert_eq!(
        err,
        Error::Compile(Diagnostic::new(
            Position::new(2, 1),
            ErrorKind::UnknownVariable("nope".into())
        ))
    );
}

#[test]
fn test_member_access_unsupported() {
    let err = compile_err(vec![var("o", num("1")), expr(member(ident("o"), "x").at(1, 2))]);
    assert_eq!(
        err,
        Error::Compile(Diagnostic::new(
            Position::new(1, 2),
            ErrorKind::UnsupportedFeature("member access")
        ))
    );
}

// ============================================================================
// Declarations and assignment
// ============================================================================

#[test]
fn test_compile_variable_declaration() {
    let bytecode = compile_ok(vec![var("x", num("1")), expr(ident("x"))]);
    let mut expected = int(1).to_vec();
    expected.push(store(0));
    expected.push(load(0));
    expected.push(simple(OpCode::Pop));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
    assert_eq!(bytecode.local_count, 1);
}

#[test]
fn test_self_referencing_initializer_sees_old_binding() {
    let bytecode = compile_ok(vec![
        var("x", num("1")),
        if_(num("1"), vec![var("x", binary(ident("x"), "+", num("1")))]),
    ]);
    // The inner initializer reads the outer slot and stores into a new one
    assert!(bytecode.instructions.contains(&load(0)));
    assert!(bytecode.instructions.contains(&store(1)));
}

#[test]
fn test_self_referencing_initializer_without_binding() {
    let err = compile_err(vec![var("y", ident("y"))]);
    assert_eq!(err.kind(), Some(&ErrorKind::UnknownVariable("y".into())));
}

#[test]
fn test_compile_variable_assignment() {
    let bytecode = compile_ok(vec![var("x", num("1")), assign("x", num("2"))]);
    let mut expected = int(1).to_vec();
    expected.push(store(0));
    expected.extend(int(2));
    expected.push(store(0));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
}

#[test]
fn test_assignment_to_undeclared() {
    let err = compile_err(vec![assign("x", num("1")).at(5, 1)]);
    assert_eq!(
        err,
        Error::Compile(Diagnostic::new(
            Position::new(5, 1),
            ErrorKind::UnknownVariable("x".into())
        ))
    );
}

#[test]
fn test_assignment_to_undeclared_in_nested_block() {
    let err = compile_err(vec![while_(num("0"), vec![if_(num("1"), vec![assign("z", num("1"))])])]);
    assert_eq!(err.kind(), Some(&ErrorKind::UnknownVariable("z".into())));
}

#[test]
fn test_assignment_checked_before_value() {
    // The unknown target is reported even though the value is also invalid
    let err = compile_err(vec![assign("x", num("99999999999"))]);
    assert_eq!(err.kind(), Some(&ErrorKind::UnknownVariable("x".into())));
}

#[test]
fn test_first_error_aborts() {
    let err = compile_err(vec![expr(ident("a")), expr(ident("b"))]);
    assert_eq!(err.kind(), Some(&ErrorKind::UnknownVariable("a".into())));
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_shadowed_binding_restored_after_block() {
    let bytecode = compile_ok(vec![
        var("x", num("1")),
        if_(num("1"), vec![var("x", num("2"))]),
        expr(ident("x")),
    ]);
    let n = bytecode.len();
    assert_eq!(bytecode.instructions[n - 3], load(0));
}

#[test]
fn test_block_local_unresolvable_after_block() {
    let err = compile_err(vec![
        if_(num("1"), vec![var("y", num("1"))]),
        assign("y", num("2")),
    ]);
    assert_eq!(err.kind(), Some(&ErrorKind::UnknownVariable("y".into())));
}

#[test]
fn test_block_local_visible_inside_block() {
    compile_ok(vec![while_(
        num("0"),
        vec![var("y", num("1")), assign("y", binary(ident("y"), "+", num("1")))],
    )]);
}

#[test]
fn test_top_level_redeclaration_uses_new_slot() {
    let bytecode = compile_ok(vec![var("x", num("1")), var("x", num("2")), expr(ident("x"))]);
    assert_eq!(bytecode.local_count, 2);
    let n = bytecode.len();
    assert_eq!(bytecode.instructions[n - 3], load(1));
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_compile_if_statement() {
    let bytecode = compile_ok(vec![if_(num("1"), vec![expr(num("2"))])]);
    let mut expected = int(1).to_vec();
    expected.push(runtime(RuntimeOp::ToBool));
    expected.push(jump_if_false(7));
    expected.extend(int(2));
    expected.push(simple(OpCode::Pop));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
}

#[test]
fn test_compile_while_loop() {
    let bytecode = compile_ok(vec![while_(num("0"), vec![expr(num("2"))])]);
    let mut expected = int(0).to_vec();
    expected.push(runtime(RuntimeOp::ToBool));
    expected.push(jump_if_false(8));
    expected.extend(int(2));
    expected.push(simple(OpCode::Pop));
    expected.push(jump(0));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
}

#[test]
fn test_while_loop_after_prelude_jumps_to_condition() {
    let bytecode = compile_ok(vec![var("i", num("0")), while_(ident("i"), vec![])]);
    // loop label sits after the declaration (3 instructions)
    assert_eq!(
        &bytecode.instructions[3..],
        &[
            load(0),
            runtime(RuntimeOp::ToBool),
            jump_if_false(7),
            jump(3),
            simple(OpCode::Return),
        ]
    );
}

#[test]
fn test_compile_switch() {
    let bytecode = compile_ok(vec![switch(
        num("1"),
        vec![case(num("1"), vec![expr(num("10"))]), default(vec![expr(num("20"))])],
    )]);

    let mut expected = int(1).to_vec();
    expected.push(store(0));
    // case 1
    expected.extend(int(1));
    expected.push(load(0));
    expected.push(runtime(RuntimeOp::Eq));
    expected.push(runtime(RuntimeOp::ToBool));
    expected.push(jump_if_false(13));
    expected.extend(int(10));
    expected.push(simple(OpCode::Pop));
    expected.push(jump(17));
    // default
    expected.extend(int(20));
    expected.push(simple(OpCode::Pop));
    expected.push(jump(17));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
    assert_eq!(bytecode.local_count, 1);
}

#[test]
fn test_switch_condition_compiled_once() {
    let bodies = (1..=5)
        .map(|n| case(num(&n.to_string()), vec![]))
        .collect::<Vec<_>>();
    let bytecode = compile_ok(vec![
        var("f", num("0")),
        switch(call(ident("f"), vec![]), bodies),
    ]);
    let calls = bytecode
        .instructions
        .iter()
        .filter(|i| **i == runtime(RuntimeOp::Call))
        .count();
    let compares = bytecode
        .instructions
        .iter()
        .filter(|i| **i == runtime(RuntimeOp::Eq))
        .count();
    assert_eq!(calls, 1);
    assert_eq!(compares, 5);
}

#[test]
fn test_switch_without_arms() {
    let bytecode = compile_ok(vec![switch(num("3"), vec![])]);
    let mut expected = int(3).to_vec();
    expected.push(store(0));
    expected.push(simple(OpCode::Return));
    assert_eq!(bytecode.instructions, expected);
}

#[test]
fn test_switch_arms_after_default_still_compiled() {
    let bytecode = compile_ok(vec![switch(
        num("1"),
        vec![default(vec![]), case(num("1"), vec![expr(num("5"))])],
    )]);
    // default arm: unconditional jump straight to the end
    assert_eq!(bytecode.instructions[3], jump(bytecode.len() as u32 - 1));
    assert!(bytecode.instructions.contains(&with(OpCode::LoadInt, Operand::Int(5))));
}

#[test]
fn test_switch_arm_scopes_are_separate() {
    let err = compile_err(vec![switch(
        num("1"),
        vec![
            case(num("1"), vec![var("a", num("1"))]),
            case(num("2"), vec![assign("a", num("2"))]),
        ],
    )]);
    assert_eq!(err.kind(), Some(&ErrorKind::UnknownVariable("a".into())));
}

#[test]
fn test_nested_control_flow_labels_resolve() {
    let bytecode = compile_ok(vec![
        var("i", num("0")),
        while_(
            binary(ident("i"), "<", num("3")),
            vec![
                if_(binary(ident("i"), "==", num("1")), vec![expr(num("7"))]),
                switch(ident("i"), vec![case(num("2"), vec![]), default(vec![])]),
                assign("i", binary(ident("i"), "+", num("1"))),
            ],
        ),
    ]);
    let len = bytecode.len() as u32;
    for instruction in &bytecode.instructions {
        if let Some(target) = instruction.jump_target() {
            assert!(target < len);
        }
    }
}

// ============================================================================
// Operand limits
// ============================================================================

#[test]
fn test_last_addressable_local() {
    let statements = (0..65_536).map(|_| var("x", num("1"))).collect();
    let bytecode = compile_ok(statements);
    assert_eq!(bytecode.local_count, 65_536);
    assert!(bytecode.instructions.contains(&store(u16::MAX)));
}

#[test]
fn test_too_many_locals_is_internal() {
    let statements = (0..70_000).map(|_| var("x", num("1"))).collect();
    let err = compile_err(statements);
    assert_eq!(err, Error::Internal(InternalError::TooManyLocals));
}

#[test]
fn test_switch_temporary_counts_toward_locals() {
    let mut statements: Vec<_> = (0..65_536).map(|_| var("x", num("1"))).collect();
    statements.push(switch(num("1"), vec![]));
    let err = compile_err(statements);
    assert_eq!(err, Error::Internal(InternalError::TooManyLocals));
}

#[test]
fn test_widest_argument_list() {
    let arguments = vec![num("1"); 65_535];
    let bytecode = compile_ok(vec![
        var("f", num("0")),
        expr(call(ident("f"), arguments)),
    ]);
    assert!(bytecode
        .instructions
        .contains(&with(OpCode::NewArgs, Operand::Count(u16::MAX))));
    let last_store = bytecode
        .instructions
        .iter()
        .rev()
        .find(|i| i.opcode == OpCode::StoreArg)
        .cloned();
    assert_eq!(last_store, Some(with(OpCode::StoreArg, Operand::Index(65_534))));
}

#[test]
fn test_too_many_arguments_is_internal() {
    let arguments = vec![num("1"); 65_537];
    let err = compile_err(vec![
        var("f", num("0")),
        expr(call(ident("f"), arguments)),
    ]);
    assert_eq!(
        err,
        Error::Internal(InternalError::TooManyOperands {
            what: "arguments",
            count: 65_537,
        })
    );
}

#[test]
fn test_too_many_builtins_is_internal() {
    let mut builtins = Builtins::new();
    for n in 0..65_537 {
        builtins.push(format!("g{}", n), crate::runtime::Value::Null);
    }
    let err = Compiler::new()
        .with_builtins(&builtins)
        .compile(&program(vec![]))
        .unwrap_err();
    assert_eq!(
        err,
        Error::Internal(InternalError::TooManyOperands {
            what: "builtins",
            count: 65_537,
        })
    );
}

// ============================================================================
// Runtime library and sinks
// ============================================================================

struct PartialRuntime;

impl RuntimeLibrary for PartialRuntime {
    fn lookup(&self, name: &str) -> Option<EntryPoint> {
        if name == "ToBool" {
            None
        } else {
            StandardRuntime.lookup(name)
        }
    }

    fn operation(&self, entry: EntryPoint) -> Option<RuntimeOp> {
        StandardRuntime.operation(entry)
    }
}

#[test]
fn test_unresolvable_runtime_op_is_internal() {
    let err = Compiler::new()
        .with_builtins(&Builtins::new())
        .with_runtime(&PartialRuntime)
        .compile(&program(vec![if_(num("1"), vec![])]))
        .unwrap_err();
    assert_eq!(err, Error::Internal(InternalError::UnresolvedRuntimeOp("ToBool")));
    assert!(err.diagnostic().is_none());
}

#[test]
fn test_partial_runtime_ok_when_op_unused() {
    let bytecode = Compiler::new()
        .with_runtime(&PartialRuntime)
        .compile(&program(vec![expr(binary(num("1"), "+", num("2")))]))
        .unwrap();
    assert!(!bytecode.is_empty());
}

/// Records sink calls as text, to check the compiler only speaks the sink
/// interface.
#[derive(Default)]
struct RecordingSink {
    log: Vec<String>,
    labels: u32,
}

impl InstructionSink for RecordingSink {
    type Output = Vec<String>;

    fn append(&mut self, instruction: Instruction) {
        self.log.push(instruction.to_string());
    }

    fn new_label(&mut self) -> Label {
        self.labels += 1;
        Label(self.labels - 1)
    }

    fn bind_label(&mut self, label: Label) -> Result<(), InternalError> {
        self.log.push(format!("{}:", label));
        Ok(())
    }

    fn emit_branch_if_false(&mut self, label: Label) {
        self.log.push(format!("brfalse {}", label));
    }

    fn emit_jump(&mut self, label: Label) {
        self.log.push(format!("br {}", label));
    }

    fn finish(self, _local_count: usize) -> Result<Vec<String>, InternalError> {
        Ok(self.log)
    }
}

#[test]
fn test_compile_into_custom_sink() {
    let log = Compiler::with_sink(RecordingSink::default())
        .with_builtins(&Builtins::new())
        .compile(&program(vec![while_(num("0"), vec![])]))
        .unwrap();
    assert_eq!(
        log,
        vec![
            "L0:",
            "LoadInt 0",
            "BoxInt",
            "CallRuntime @7",
            "brfalse L1",
            "br L0",
            "L1:",
            "Return",
        ]
    );
}
