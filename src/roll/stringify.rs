use super::dice::{DieRoll, DieStatus};
use super::result::GroupRolls;
use crate::common::*;
use crate::parse::{
    ast::{self, parenthesize, UNARY_PRECEDENCE},
    visit::{self, Accept},
};

/// Renders an expression alongside the dice it rolled.
///
/// Every dice group is written as its notation followed by its rolls in
/// brackets, so dropping the bracketed parts leaves an expression that
/// parses back to the same tree.
pub trait Stringify {
    fn breakdown(&mut self, node: &ast::Node, rolls: &[GroupRolls]) -> String {
        let mut visitor = Breakdown {
            style: self,
            rolls,
            next: 0,
        };
        node.accept(&mut visitor)
    }

    fn str_literal(&mut self, x: Int) -> String {
        x.to_string()
    }

    fn str_face(&mut self, die: &DieRoll, _sides: Sides) -> String {
        if die.value == die.rolled {
            die.value.to_string()
        } else {
            format!("{}->{}", die.rolled, die.value)
        }
    }

    fn str_die(&mut self, die: &DieRoll, sides: Sides) -> String {
        let mut ret = self.str_face(die, sides);
        if die.exploded {
            ret.push('!');
        }
        if die.is_kept() && die.success == Some(true) {
            ret.push('s');
        }
        match die.status {
            DieStatus::Kept => ret,
            DieStatus::Dropped => format!("~~{}~~", ret),
            DieStatus::Rerolled => format!("{}r", ret),
        }
    }

    fn str_dice(&mut self, group: &ast::DiceGroup, rolls: Option<&GroupRolls>) -> String {
        let mut dice = Vec::new();
        for die in rolls.into_iter().flat_map(|g| g.rolls.iter()) {
            dice.push(self.str_die(die, group.sides));
        }
        format!("{} [{}]", group, dice.join(", "))
    }

    fn str_unary(&mut self, op: UnaryOperator, value: String) -> String {
        format!("{}{}", op, value)
    }

    fn str_binary(&mut self, l: String, op: BinaryOperator, r: String) -> String {
        format!("{} {} {}", l, op, r)
    }

    fn str_total(&mut self, total: Int) -> String {
        total.to_string()
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct SimpleStringifier;

impl SimpleStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for SimpleStringifier {}

/// Like [`SimpleStringifier`], with natural ones and maximum faces in bold
/// and the total in code ticks. Only the face as rolled is bolded, never a
/// clamped value.
#[derive(Debug, Default, Copy, Clone)]
pub struct MarkdownStringifier;

impl MarkdownStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for MarkdownStringifier {
    fn str_face(&mut self, die: &DieRoll, sides: Sides) -> String {
        let rolled = if die.rolled == 1 || die.rolled == Int::from(sides.get()) {
            format!("**{}**", die.rolled)
        } else {
            die.rolled.to_string()
        };
        if die.value == die.rolled {
            rolled
        } else {
            format!("{}->{}", rolled, die.value)
        }
    }

    fn str_total(&mut self, total: Int) -> String {
        format!("`{}`", total)
    }
}

struct Breakdown<'s, 'r, S: ?Sized> {
    style: &'s mut S,
    rolls: &'r [GroupRolls],
    next: usize,
}

impl<S: Stringify + ?Sized> visit::AstVisitor for Breakdown<'_, '_, S> {
    type Output = String;

    fn visit_literal(&mut self, x: Int) -> Self::Output {
        self.style.str_literal(x)
    }

    fn visit_dice(&mut self, group: &ast::DiceGroup) -> Self::Output {
        let index = self.next;
        self.next += 1;
        let rolls = self.rolls.iter().find(|g| g.index == index);
        self.style.str_dice(group, rolls)
    }

    fn visit_unary(&mut self, op: UnaryOperator, r: &ast::Node) -> Self::Output {
        let value = r.accept(self);
        let value = parenthesize(r, value, UNARY_PRECEDENCE);
        self.style.str_unary(op, value)
    }

    fn visit_binary(&mut self, l: &ast::Node, op: BinaryOperator, r: &ast::Node) -> Self::Output {
        let left = l.accept(self);
        let left = parenthesize(l, left, op.precedence());
        let right = r.accept(self);
        let right = parenthesize(r, right, op.precedence() + 1);
        self.style.str_binary(left, op, right)
    }
}

/// Renders a whole result line, `breakdown = total`.
pub fn render<S: Stringify + ?Sized>(
    style: &mut S,
    node: &ast::Node,
    rolls: &[GroupRolls],
    total: Int,
) -> String {
    let breakdown = style.breakdown(node, rolls);
    let total = style.str_total(total);
    format!("{} = {}", breakdown, total)
}
