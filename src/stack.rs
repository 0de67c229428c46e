use log::{debug, trace};

use crate::config::EvalConfig;
use crate::errors::*;
use crate::number::Number;
use crate::registry::{Associativity, Evaluator, Fixity, Registry};
use crate::token::{Token, TokenKind};

/// What the reducer does with a node
#[derive(Debug, Clone)]
pub enum Action<'r> {
    /// Read the token text as a number literal
    Literal,
    Apply(&'r Evaluator),
    /// The token has no evaluator: reducing stops here
    Unhandled,
}

/// A token of the postfix sequence with the action it stands for
#[derive(Debug, Clone)]
pub struct Node<'r> {
    pub token: Token,
    pub action: Action<'r>,
}

impl<'r> Node<'r> {
    pub fn new(token: Token, action: Action<'r>) -> Self {
        Node { token, action }
    }
}

/// Tokens rearranged into postfix order plus everything found wrong on the
/// way
#[derive(Debug, Clone, Default)]
pub struct Arrangement<'r> {
    pub nodes: Vec<Node<'r>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Final value of an expression. `result` is `Undefined` whenever the
/// expression could not be reduced
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub result: Number,
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[derive(Debug)]
enum Entry<'r> {
    OpenB(Token),
    Op(Token, &'r Evaluator),
    Func(Token, &'r Evaluator),
}

/// Shunting-yard arranger. A fresh one is used for every expression
pub(crate) struct Stack<'r> {
    registry: &'r Registry,
    queue: Vec<Entry<'r>>,
    output: Vec<Node<'r>>,
    diagnostics: Vec<Diagnostic>,
    // true at the start, after an operator, an open bracket or a function
    expect_operand: bool,
}

impl<'r> Stack<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Stack {
            registry,
            queue: Vec::new(),
            output: Vec::new(),
            diagnostics: Vec::new(),
            expect_operand: true,
        }
    }

    fn report(&mut self, kind: DiagnosticKind, position: usize) {
        let d = Diagnostic::new(kind, position);
        debug!("{}", d);
        self.diagnostics.push(d);
    }

    fn emit(&mut self, node: Node<'r>) {
        trace!("node {}", node.token);
        self.output.push(node);
    }

    fn emit_entry(&mut self, entry: Entry<'r>) {
        match entry {
            Entry::Op(token, ev) | Entry::Func(token, ev) => self.emit(Node::new(token, Action::Apply(ev))),
            Entry::OpenB(..) => {} // never emitted
        }
    }

    fn unhandled(&mut self, token: Token) {
        self.report(DiagnosticKind::UnhandledToken, token.position);
        self.emit(Node::new(token, Action::Unhandled));
    }

    // move operators from the queue to output while the top operator in the
    // queue binds tighter than the incoming one
    fn pop_while_priority(&mut self, incoming: &Evaluator) {
        while let Some(e) = self.queue.pop() {
            let tighter = match &e {
                Entry::OpenB(..) => false,
                Entry::Func(..) => true,
                Entry::Op(_, ev) => {
                    ev.precedence > incoming.precedence
                        || (ev.precedence == incoming.precedence && incoming.associativity == Associativity::Left)
                }
            };
            if !tighter {
                self.queue.push(e);
                return;
            }
            self.emit_entry(e);
        }
    }

    // move operators from the queue to output until the first open bracket,
    // the bracket is dropped
    fn pop_until_bracket(&mut self, position: usize) {
        while let Some(e) = self.queue.pop() {
            if let Entry::OpenB(..) = e {
                return;
            }
            self.emit_entry(e);
        }
        self.report(DiagnosticKind::MismatchedBracket, position);
    }

    // move functions from the queue to output
    fn pop_functions(&mut self) {
        while let Some(e) = self.queue.pop() {
            match e {
                Entry::Func(..) => self.emit_entry(e),
                _ => {
                    self.queue.push(e);
                    return;
                }
            }
        }
    }

    // move all operators from queue to output. Must be called only after the
    // expression ends: brackets left in the queue were never closed
    fn pop_all(&mut self) {
        while let Some(e) = self.queue.pop() {
            match e {
                Entry::OpenB(token) => self.report(DiagnosticKind::MismatchedBracket, token.position),
                _ => self.emit_entry(e),
            }
        }
    }

    fn push_operator(&mut self, token: Token) {
        let reg = self.registry;
        if self.expect_operand {
            match reg.lookup(&token, &[Fixity::Prefix]) {
                Some(ev) => self.queue.push(Entry::Op(token, ev)),
                None => self.unhandled(token),
            }
            return;
        }

        if let Some(ev) = reg.lookup(&token, &[Fixity::Postfix]) {
            self.pop_functions();
            self.emit(Node::new(token, Action::Apply(ev)));
            return;
        }
        match reg.lookup(&token, &[Fixity::Infix]) {
            Some(ev) => {
                self.pop_while_priority(ev);
                self.queue.push(Entry::Op(token, ev));
                self.expect_operand = true;
            }
            None => self.unhandled(token),
        }
    }

    pub(crate) fn push(&mut self, token: Token) {
        let reg = self.registry;
        match token.kind {
            TokenKind::Invalid => self.report(DiagnosticKind::InvalidToken, token.position),
            TokenKind::Number => {
                self.emit(Node::new(token, Action::Literal));
                self.expect_operand = false;
            }
            TokenKind::FunctionName => match reg.lookup(&token, &[Fixity::Function]) {
                Some(ev) => {
                    self.queue.push(Entry::Func(token, ev));
                    self.expect_operand = true;
                }
                None => self.unhandled(token),
            },
            TokenKind::BracketOpen => match reg.lookup(&token, &[Fixity::OpenBracket]) {
                Some(..) => {
                    self.queue.push(Entry::OpenB(token));
                    self.expect_operand = true;
                }
                None => self.unhandled(token),
            },
            TokenKind::BracketClose => match reg.lookup(&token, &[Fixity::CloseBracket]) {
                Some(..) => {
                    self.pop_until_bracket(token.position);
                    self.expect_operand = false;
                }
                None => self.unhandled(token),
            },
            TokenKind::Operator => self.push_operator(token),
        }
    }

    pub(crate) fn finish(mut self) -> Arrangement<'r> {
        self.pop_all();
        Arrangement {
            nodes: self.output,
            diagnostics: self.diagnostics,
        }
    }
}

/// Rearranges infix tokens into postfix nodes
pub fn arrange<'r, I>(registry: &'r Registry, tokens: I) -> Arrangement<'r>
where
    I: IntoIterator<Item = Token>,
{
    let mut stack = Stack::new(registry);
    for token in tokens {
        stack.push(token);
    }
    stack.finish()
}

/// Reduces postfix nodes to a single value. `diagnostics` are the findings
/// of the earlier stages, new ones are appended to them
pub fn calculate(nodes: &[Node], cfg: &EvalConfig, diagnostics: Vec<Diagnostic>) -> Evaluation {
    let mut values: Vec<Number> = Vec::new();
    let prec = cfg.float_bits();
    let abort = |mut diagnostics: Vec<Diagnostic>, d: Option<Diagnostic>| {
        if let Some(d) = d {
            debug!("{}", d);
            diagnostics.push(d);
        }
        debug!("evaluation aborted");
        Evaluation {
            result: Number::UNDEFINED,
            diagnostics,
        }
    };

    for node in nodes {
        let pos = node.token.position;
        match &node.action {
            Action::Literal => match Number::from_literal(&node.token.value, cfg.base, cfg.decimal_point, prec) {
                Ok(v) => values.push(v),
                Err(e) => {
                    debug!("{}", e);
                    return abort(diagnostics, Some(Diagnostic::new(DiagnosticKind::InvalidToken, pos)));
                }
            },
            Action::Apply(ev) => {
                if values.len() < ev.operands {
                    return abort(diagnostics, Some(Diagnostic::new(DiagnosticKind::MissingOperand, pos)));
                }
                let args = values.split_off(values.len() - ev.operands);
                let v = ev.apply(&args, cfg);
                trace!("{} -> {}", node.token, v);
                values.push(v);
            }
            Action::Unhandled => return abort(diagnostics, None),
        }
    }

    if values.len() != 1 {
        let pos = nodes.last().map_or(0, |n| n.token.position);
        return abort(diagnostics, Some(Diagnostic::new(DiagnosticKind::MalformedExpression, pos)));
    }

    // values has exactly one item
    let result = values.pop().unwrap_or(Number::UNDEFINED);
    Evaluation { result, diagnostics }
}
