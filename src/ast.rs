use std::rc::Rc;

use derive_more::From;

use crate::{common::Span, token::Token};

#[derive(Debug, Clone)]
pub struct Lit {
    pub token: Token,
}

#[derive(Debug, Clone)]
pub struct VarExpr {
    pub ident: Token,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: Token,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: Token,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// `target = value`. The parser only builds this for valid targets
/// (variables, index expressions, member accesses).
#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct IdxExpr {
    pub target: Box<Expr>,
    pub idx: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub target: Box<Expr>,
    pub field: Token,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

/// Function literal. The body lives behind an `Rc` so creating a closure
/// value at evaluation time shares the tree instead of cloning it.
#[derive(Debug, Clone)]
pub struct FunLit {
    pub name: Option<String>,
    pub params: Vec<Token>,
    pub body: Rc<Block>,
}

#[derive(Debug, Clone)]
pub struct ObjLit {
    pub inits: Vec<(Token, Expr)>,
}

#[derive(Debug, Clone)]
pub struct ArrLit {
    pub elements: Vec<Expr>,
}

#[derive(Debug, Clone, From)]
pub enum ExprKind {
    Lit(Lit),
    Var(VarExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Assign(AssignExpr),
    Idx(IdxExpr),
    Member(MemberExpr),
    Call(CallExpr),
    FunLit(FunLit),
    ObjLit(ObjLit),
    ArrLit(ArrLit),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct LetStmt {
    pub ident: Token,
    pub init: Expr,
}

#[derive(Debug, Clone)]
pub struct FunDecl {
    pub ident: Token,
    pub fun: FunLit,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub elif_stmts: Vec<(Expr, Block)>,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub ident: Token,
    pub iterable: Expr,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, From)]
pub enum StmtKind {
    Let(LetStmt),
    Fun(FunDecl),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Block(Block),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    /// Whether this statement produces a value worth echoing in the REPL.
    pub fn is_expression(&self) -> bool {
        matches!(self.kind, StmtKind::Expr(_))
    }
}
