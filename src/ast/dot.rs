use super::{Block, Expr, Program, Stmt, UnOp};
use std::fmt::{self, Display, Formatter};

/// Graphviz rendering of a parsed program, one box per node.
pub struct Dot<'a>(pub &'a Program);

impl Program {
    pub fn dot(&self) -> Dot<'_> {
        Dot(self)
    }
}

impl Display for Dot<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph AST {{")?;
        writeln!(f, "  node [shape=box];")?;
        let mut graph = Graph { f, next_id: 0 };
        let root = graph.node(None, "Program")?;
        for stmt in &self.0.statements {
            graph.stmt(root, stmt)?;
        }
        writeln!(graph.f, "}}")
    }
}

struct Graph<'a, 'b> {
    f: &'a mut Formatter<'b>,
    next_id: usize,
}

impl Graph<'_, '_> {
    /// Emits a node and the edge from its parent, returning the new id.
    fn node(&mut self, parent: Option<usize>, label: &str) -> Result<usize, fmt::Error> {
        let id = self.next_id;
        self.next_id += 1;
        let label = label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n");
        writeln!(self.f, "  n{} [label=\"{}\"];", id, label)?;
        if let Some(parent) = parent {
            writeln!(self.f, "  n{} -> n{};", parent, id)?;
        }
        Ok(id)
    }

    fn block(&mut self, parent: usize, label: &str, block: &Block) -> fmt::Result {
        let id = self.node(Some(parent), label)?;
        block
            .statements
            .iter()
            .try_for_each(|stmt| self.stmt(id, stmt))
    }

    fn stmt(&mut self, parent: usize, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::Declaration { name, ty, init, .. } => {
                let label = match ty {
                    Some(ty) => format!("Declaration {}: {}", name, ty),
                    None => format!("Declaration {}", name),
                };
                let id = self.node(Some(parent), &label)?;
                if let Some(init) = init {
                    self.expr(id, init)?;
                }
            }
            Stmt::Assignment { name, value, .. } => {
                let id = self.node(Some(parent), &format!("Assignment {}", name))?;
                self.expr(id, value)?;
            }
            Stmt::Read { name, .. } => {
                self.node(Some(parent), &format!("Read {}", name))?;
            }
            Stmt::Write { exprs, .. } => {
                let id = self.node(Some(parent), "Write")?;
                for expr in exprs {
                    self.expr(id, expr)?;
                }
            }
            Stmt::Conditional {
                cond,
                then_block,
                else_block,
                ..
            } => {
                let id = self.node(Some(parent), "Conditional")?;
                self.expr(id, cond)?;
                self.block(id, "Then", then_block)?;
                if let Some(else_block) = else_block {
                    self.block(id, "Else", else_block)?;
                }
            }
            Stmt::Repetition { cond, body, .. } => {
                let id = self.node(Some(parent), "Repetition")?;
                self.expr(id, cond)?;
                self.block(id, "Block", body)?;
            }
            Stmt::Block(block) => self.block(parent, "Block", block)?,
        }
        Ok(())
    }

    fn expr(&mut self, parent: usize, expr: &Expr) -> fmt::Result {
        match expr {
            Expr::Grouping(inner) => {
                let id = self.node(Some(parent), "( )")?;
                self.expr(id, inner)
            }
            Expr::Binary(lhs, op, rhs, _) => {
                let id = self.node(Some(parent), op.symbol())?;
                self.expr(id, lhs)?;
                self.expr(id, rhs)
            }
            Expr::Unary(op, inner, _) => {
                let symbol = match op {
                    UnOp::Not => "!",
                    UnOp::Negate => "-",
                };
                let id = self.node(Some(parent), symbol)?;
                self.expr(id, inner)
            }
            leaf => self.node(Some(parent), &leaf.to_string()).map(|_| ()),
        }
    }
}
