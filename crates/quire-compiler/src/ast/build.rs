//! Terse constructors for building trees by hand.
//!
//! Used by tests, benchmarks and hosts that synthesize programs without a
//! parser. Positions default to `0:0`; use [`Positioned::at`] to set one.
//!
//! ```
//! use quire_compiler::ast::build::*;
//!
//! let program = program(vec![
//!     var("x", num("1")),
//!     while_(binary(ident("x"), "<", num("10")), vec![
//!         assign("x", binary(ident("x"), "+", num("1"))),
//!     ]),
//! ]);
//! assert_eq!(program.statements.len(), 2);
//! ```

use super::*;

/// A program from top-level statements.
pub fn program(statements: Vec<Statement>) -> Program {
    Program::new(statements)
}

/// A numeric literal.
pub fn num(literal: &str) -> Expression {
    Expression::Number(NumberLiteral {
        literal: literal.to_string(),
        position: Position::default(),
    })
}

/// An identifier reference.
pub fn ident(name: &str) -> Expression {
    Expression::Identifier(Identifier {
        name: name.to_string(),
        position: Position::default(),
    })
}

/// `left operator right`
pub fn binary(left: Expression, operator: &str, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        left: Box::new(left),
        operator: operator.to_string(),
        right: Box::new(right),
        position: Position::default(),
    })
}

/// `callee(arguments...)`
pub fn call(callee: Expression, arguments: Vec<Expression>) -> Expression {
    Expression::Call(CallExpression {
        callee: Box::new(callee),
        arguments,
        position: Position::default(),
    })
}

/// `(inner)`
pub fn parens(inner: Expression) -> Expression {
    Expression::Parentheses(ParenthesesExpression {
        inner: Box::new(inner),
        position: Position::default(),
    })
}

/// `object.member`
pub fn member(object: Expression, name: &str) -> Expression {
    Expression::MemberAccess(MemberAccess {
        object: Box::new(object),
        member: name.to_string(),
        position: Position::default(),
    })
}

/// `var name = expr;`
pub fn var(name: &str, expr: Expression) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration {
        name: name.to_string(),
        expr,
        position: Position::default(),
    })
}

/// `name = expr;`
pub fn assign(name: &str, expr: Expression) -> Statement {
    Statement::VariableAssignment(VariableAssignment {
        name: name.to_string(),
        expr,
        position: Position::default(),
    })
}

/// `expr;`
pub fn expr(expr: Expression) -> Statement {
    Statement::Expression(ExpressionStatement {
        expr,
        position: Position::default(),
    })
}

/// `if (condition) { body }`
pub fn if_(condition: Expression, body: Vec<Statement>) -> Statement {
    Statement::If(IfStatement {
        condition,
        body: Block::new(body),
        position: Position::default(),
    })
}

/// `while (condition) { body }`
pub fn while_(condition: Expression, body: Vec<Statement>) -> Statement {
    Statement::While(WhileStatement {
        condition,
        body: Block::new(body),
        position: Position::default(),
    })
}

/// `switch (condition) { bodies }`
pub fn switch(condition: Expression, bodies: Vec<SwitchBody>) -> Statement {
    Statement::Switch(SwitchStatement {
        condition,
        bodies,
        position: Position::default(),
    })
}

/// `case value: { body }`
pub fn case(value: Expression, body: Vec<Statement>) -> SwitchBody {
    SwitchBody {
        case_value: Some(value),
        block: Block::new(body),
    }
}

/// `default: { body }`
pub fn default(body: Vec<Statement>) -> SwitchBody {
    SwitchBody {
        case_value: None,
        block: Block::new(body),
    }
}

/// Nodes whose position can be set after construction.
pub trait Positioned: Sized {
    /// Returns the node with its position set.
    fn at(self, line: u32, column: u32) -> Self;
}

impl Positioned for Expression {
    fn at(mut self, line: u32, column: u32) -> Self {
        let position = Position::new(line, column);
        match &mut self {
            Expression::Binary(e) => e.position = position,
            Expression::Call(e) => e.position = position,
            Expression::Parentheses(e) => e.position = position,
            Expression::Number(e) => e.position = position,
            Expression::Identifier(e) => e.position = position,
            Expression::MemberAccess(e) => e.position = position,
        }
        self
    }
}

impl Positioned for Statement {
    fn at(mut self, line: u32, column: u32) -> Self {
        let position = Position::new(line, column);
        match &mut self {
            Statement::If(s) => s.position = position,
            Statement::While(s) => s.position = position,
            Statement::Switch(s) => s.position = position,
            Statement::Expression(s) => s.position = position,
            Statement::VariableDeclaration(s) => s.position = position,
            Statement::VariableAssignment(s) => s.position = position,
        }
        self
    }
}
