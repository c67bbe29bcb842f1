use crate::common::*;
use crate::parse::ast;

pub trait AstVisitor {
    type Output;

    fn visit<T: ?Sized>(&mut self, node: &T) -> Self::Output
    where
        T: Accept<Self>,
    {
        node.accept(self)
    }

    fn visit_literal(&mut self, x: Int) -> Self::Output;

    fn visit_dice(&mut self, dice: &ast::DiceGroup) -> Self::Output;

    fn visit_unary(&mut self, op: UnaryOperator, r: &ast::Node) -> Self::Output;

    fn visit_binary(&mut self, l: &ast::Node, op: BinaryOperator, r: &ast::Node) -> Self::Output;
}

pub trait Accept<V: AstVisitor + ?Sized> {
    fn accept(&self, v: &mut V) -> V::Output;
}

impl<V: AstVisitor + ?Sized> Accept<V> for ast::Node {
    fn accept(&self, v: &mut V) -> V::Output {
        match self {
            Self::Literal(x) => v.visit_literal(*x),
            Self::Dice(x) => v.visit_dice(x),
            Self::Unary(op, x) => v.visit_unary(*op, x),
            Self::Binary(l, op, r) => v.visit_binary(l, *op, r),
        }
    }
}
