//! Abstract Syntax Tree (AST) definitions for the scripting language.
//!
//! The tree is produced by an external parser and consumed read-only by the
//! compiler. Every node derives `serde` traits so a parser written in any
//! language can hand programs over as JSON.

pub mod build;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A position in the source text (1-based; `0:0` when unknown).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Line number
    pub line: u32,
    /// Column number
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A complete program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Path of the script the tree was parsed from, used for diagnostics
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// The top-level statements
    pub statements: Vec<Statement>,
}

impl Program {
    /// Creates a program with no source reference.
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            source: None,
            statements,
        }
    }
}

/// An ordered list of statements forming one lexical scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// The statements in the block
    pub statements: Vec<Statement>,
}

impl Block {
    /// Creates a block from its statements.
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `if (condition) { body }`
    If(IfStatement),
    /// `while (condition) { body }`
    While(WhileStatement),
    /// `switch (condition) { case ...: { } default: { } }`
    Switch(SwitchStatement),
    /// An expression evaluated for its side effects
    Expression(ExpressionStatement),
    /// `var name = expr;`
    VariableDeclaration(VariableDeclaration),
    /// `name = expr;`
    VariableAssignment(VariableAssignment),
}

/// An if statement. There is no else arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    /// The condition
    pub condition: Expression,
    /// The guarded block
    pub body: Block,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// A while statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    /// The loop condition
    pub condition: Expression,
    /// The loop body
    pub body: Block,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// A switch statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStatement {
    /// The scrutinee, evaluated once
    pub condition: Expression,
    /// The arms, in source order
    pub bodies: Vec<SwitchBody>,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// One arm of a switch statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchBody {
    /// The value compared against the scrutinee; `None` for a default arm
    #[serde(default)]
    pub case_value: Option<Expression>,
    /// The arm body
    pub block: Block,
}

impl SwitchBody {
    /// Returns true for a default arm.
    pub fn is_default(&self) -> bool {
        self.case_value.is_none()
    }
}

/// An expression statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    /// The expression
    pub expr: Expression,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    /// The declared name
    pub name: String,
    /// The initializer
    pub expr: Expression,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// An assignment to an already declared variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAssignment {
    /// The assigned name
    pub name: String,
    /// The new value
    pub expr: Expression,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// `left op right`
    Binary(BinaryExpression),
    /// `callee(arguments...)`
    Call(CallExpression),
    /// `(inner)`
    Parentheses(ParenthesesExpression),
    /// A decimal integer literal, kept as its source text
    Number(NumberLiteral),
    /// A variable reference
    Identifier(Identifier),
    /// `object.member` (parsed, but never compilable)
    MemberAccess(MemberAccess),
}

impl Expression {
    /// Returns the source position of this expression.
    pub fn position(&self) -> Position {
        match self {
            Expression::Binary(e) => e.position,
            Expression::Call(e) => e.position,
            Expression::Parentheses(e) => e.position,
            Expression::Number(e) => e.position,
            Expression::Identifier(e) => e.position,
            Expression::MemberAccess(e) => e.position,
        }
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    /// The left operand
    pub left: Box<Expression>,
    /// The operator text, e.g. `+` or `==`
    pub operator: String,
    /// The right operand
    pub right: Box<Expression>,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// A call expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    /// The called value
    pub callee: Box<Expression>,
    /// The arguments, in source order
    #[serde(default)]
    pub arguments: Vec<Expression>,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenthesesExpression {
    /// The wrapped expression
    pub inner: Box<Expression>,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// A numeric literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    /// The literal exactly as written
    pub literal: String,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// An identifier reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
    /// Source position
    #[serde(default)]
    pub position: Position,
}

/// A member access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccess {
    /// The accessed object
    pub object: Box<Expression>,
    /// The member name
    pub member: String,
    /// Source position
    #[serde(default)]
    pub position: Position,
}
