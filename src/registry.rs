use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use log::debug;

use crate::config::EvalConfig;
use crate::errors::*;
use crate::number::Number;
use crate::token::{Token, TokenKind, Word};

/// Pure function applied to the operands of an operator or function, in the
/// order they appear in the expression
pub type EvalFn = fn(&[Number], &EvalConfig) -> Number;

/// Mode that holds the standard operators and functions
pub const DEFAULT_MODE: &str = "main";

pub const PRI_SUM: i32 = 10;
pub const PRI_PRODUCT: i32 = 20;
pub const PRI_POWER: i32 = 30;
pub const PRI_UNARY: i32 = 40;
pub const PRI_POSTFIX: i32 = 50;
pub const PRI_FUNCTION: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
    Function,
    OpenBracket,
    CloseBracket,
}

impl Fixity {
    /// Kind of token the tokenizer emits for a name with this fixity
    pub fn token_kind(self) -> TokenKind {
        match self {
            Fixity::Prefix | Fixity::Infix | Fixity::Postfix => TokenKind::Operator,
            Fixity::Function => TokenKind::FunctionName,
            Fixity::OpenBracket => TokenKind::BracketOpen,
            Fixity::CloseBracket => TokenKind::BracketClose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

/// One operator, function or bracket known to the parser
#[derive(Clone)]
pub struct Evaluator {
    pub name: String,
    pub fixity: Fixity,
    pub precedence: i32,
    pub associativity: Associativity,
    /// Number of values taken from the operand stack
    pub operands: usize,
    pub eval: EvalFn,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("name", &self.name)
            .field("fixity", &self.fixity)
            .field("precedence", &self.precedence)
            .field("associativity", &self.associativity)
            .field("operands", &self.operands)
            .finish()
    }
}

impl Evaluator {
    pub fn new(
        name: &str,
        fixity: Fixity,
        precedence: i32,
        associativity: Associativity,
        operands: usize,
        eval: EvalFn,
    ) -> Self {
        Evaluator {
            name: name.to_owned(),
            fixity,
            precedence,
            associativity,
            operands,
            eval,
        }
    }

    pub fn infix(name: &str, precedence: i32, associativity: Associativity, eval: EvalFn) -> Self {
        Evaluator::new(name, Fixity::Infix, precedence, associativity, 2, eval)
    }

    pub fn prefix(name: &str, eval: EvalFn) -> Self {
        Evaluator::new(name, Fixity::Prefix, PRI_UNARY, Associativity::Right, 1, eval)
    }

    pub fn postfix(name: &str, eval: EvalFn) -> Self {
        Evaluator::new(name, Fixity::Postfix, PRI_POSTFIX, Associativity::Left, 1, eval)
    }

    /// One-argument function, e.g. `sin`
    pub fn function(name: &str, eval: EvalFn) -> Self {
        Evaluator::new(name, Fixity::Function, PRI_FUNCTION, Associativity::Left, 1, eval)
    }

    pub fn bracket(name: &str, fixity: Fixity) -> Self {
        Evaluator::new(name, fixity, 0, Associativity::Left, 0, no_value)
    }

    /// Returns true if the token is of the kind this evaluator is written as
    /// and has the same name, ignoring case
    pub fn accepts(&self, token: &Token) -> bool {
        token.kind == self.fixity.token_kind() && token.value.to_lowercase() == self.name.to_lowercase()
    }

    /// Applies the evaluator to exactly `operands` values
    pub fn apply(&self, args: &[Number], cfg: &EvalConfig) -> Number {
        (self.eval)(args, cfg)
    }
}

macro_rules! unary_eval {
    ($id:ident, $method:ident) => {
        fn $id(args: &[Number], _cfg: &EvalConfig) -> Number {
            match args {
                [v] => v.clone().$method(),
                _ => Number::UNDEFINED,
            }
        }
    };
}

macro_rules! binary_eval {
    ($id:ident, $method:ident) => {
        fn $id(args: &[Number], _cfg: &EvalConfig) -> Number {
            match args {
                [v1, v2] => v1.clone().$method(v2.clone()),
                _ => Number::UNDEFINED,
            }
        }
    };
}

// functions that may create a float, which gets the configured precision
macro_rules! precise_eval {
    ($id:ident, $method:ident) => {
        fn $id(args: &[Number], cfg: &EvalConfig) -> Number {
            match args {
                [v] => v.clone().$method(cfg.float_bits()),
                _ => Number::UNDEFINED,
            }
        }
    };
}

macro_rules! angle_eval {
    ($id:ident) => {
        fn $id(args: &[Number], cfg: &EvalConfig) -> Number {
            match args {
                [v] => v.$id(cfg.angle_mode, cfg.float_bits()),
                _ => Number::UNDEFINED,
            }
        }
    };
}

fn no_value(_args: &[Number], _cfg: &EvalConfig) -> Number {
    Number::UNDEFINED
}

fn identity(args: &[Number], _cfg: &EvalConfig) -> Number {
    match args {
        [v] => v.clone(),
        _ => Number::UNDEFINED,
    }
}

binary_eval!(add, add);
binary_eval!(subtract, subtract);
binary_eval!(multiply, multiply);
binary_eval!(divide, divide);
binary_eval!(modulo, modulo);

fn power(args: &[Number], cfg: &EvalConfig) -> Number {
    match args {
        [v1, v2] => v1.clone().power(v2.clone(), cfg.float_bits()),
        _ => Number::UNDEFINED,
    }
}

unary_eval!(negate, negate);
unary_eval!(factorial, factorial);
precise_eval!(log10, log10);
precise_eval!(ln, ln);
precise_eval!(sqrt, sqrt);
precise_eval!(cbrt, cbrt);
unary_eval!(abs, abs);

angle_eval!(sin);
angle_eval!(cos);
angle_eval!(tan);

lazy_static! {
    static ref DEFAULT_EVALUATORS: Vec<Evaluator> = vec![
        Evaluator::infix("+", PRI_SUM, Associativity::Left, add),
        Evaluator::infix("-", PRI_SUM, Associativity::Left, subtract),
        Evaluator::infix("*", PRI_PRODUCT, Associativity::Left, multiply),
        Evaluator::infix("/", PRI_PRODUCT, Associativity::Left, divide),
        Evaluator::infix("mod", PRI_PRODUCT, Associativity::Left, modulo),
        Evaluator::infix("^", PRI_POWER, Associativity::Right, power),
        Evaluator::prefix("-", negate),
        Evaluator::prefix("+", identity),
        Evaluator::postfix("!", factorial),
        Evaluator::function("sin", sin),
        Evaluator::function("cos", cos),
        Evaluator::function("tan", tan),
        Evaluator::function("log", log10),
        Evaluator::function("ln", ln),
        Evaluator::function("sqrt", sqrt),
        Evaluator::function("cbrt", cbrt),
        Evaluator::function("abs", abs),
        Evaluator::bracket("(", Fixity::OpenBracket),
        Evaluator::bracket(")", Fixity::CloseBracket),
    ];
}

/// Evaluators grouped by mode. Only the active modes take part in
/// tokenizing and parsing, and they are consulted in activation order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    modes: HashMap<String, Vec<Evaluator>>,
    active: Vec<String>,
}

impl Registry {
    /// Registry without any modes
    pub fn new() -> Self {
        Default::default()
    }

    /// Registry with the standard mode set up and active
    pub fn with_defaults() -> Self {
        let mut reg = Registry::new();
        reg.setup_default_mode();
        reg.active.push(DEFAULT_MODE.to_string());
        reg
    }

    /// (Re)creates the standard mode with the default operators and
    /// functions. Evaluators registered in it before are dropped.
    pub fn setup_default_mode(&mut self) {
        self.modes.insert(DEFAULT_MODE.to_string(), DEFAULT_EVALUATORS.clone());
    }

    /// Adds an empty mode. Does nothing if the mode exists
    pub fn add_mode(&mut self, mode: &str) {
        self.modes.entry(mode.to_string()).or_default();
    }

    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes.contains_key(mode)
    }

    /// Makes `mode` the only active mode
    pub fn set_active_mode(&mut self, mode: &str) -> Result<(), CalcError> {
        if !self.has_mode(mode) {
            return Err(CalcError::UnknownMode(mode.to_string()));
        }
        self.active = vec![mode.to_string()];
        Ok(())
    }

    /// Activates one more mode. Its evaluators are consulted after the
    /// evaluators of the modes activated earlier
    pub fn activate_mode(&mut self, mode: &str) -> Result<(), CalcError> {
        if !self.has_mode(mode) {
            return Err(CalcError::UnknownMode(mode.to_string()));
        }
        if !self.active.iter().any(|m| m == mode) {
            self.active.push(mode.to_string());
        }
        Ok(())
    }

    pub fn active_modes(&self) -> &[String] {
        &self.active
    }

    /// Adds an evaluator to an existing mode. A mode cannot hold two
    /// evaluators with the same name and fixity
    pub fn register(&mut self, mode: &str, evaluator: Evaluator) -> Result<(), CalcError> {
        let list = match self.modes.get_mut(mode) {
            Some(list) => list,
            None => return Err(CalcError::UnknownMode(mode.to_string())),
        };
        let name = evaluator.name.to_lowercase();
        if list
            .iter()
            .any(|e| e.fixity == evaluator.fixity && e.name.to_lowercase() == name)
        {
            return Err(CalcError::DuplicateEvaluator {
                mode: mode.to_string(),
                name: evaluator.name,
            });
        }
        debug!("register {:?} '{}' in mode '{}'", evaluator.fixity, evaluator.name, mode);
        list.push(evaluator);
        Ok(())
    }

    /// Evaluators of the active modes, in lookup order
    pub fn evaluators(&self) -> impl Iterator<Item = &Evaluator> {
        self.active
            .iter()
            .filter_map(move |m| self.modes.get(m))
            .flat_map(|list| list.iter())
    }

    /// First active evaluator that accepts the token and has one of the
    /// given fixities
    pub fn lookup(&self, token: &Token, fixities: &[Fixity]) -> Option<&Evaluator> {
        self.evaluators()
            .find(|e| fixities.contains(&e.fixity) && e.accepts(token))
    }

    /// Names the tokenizer has to recognize
    pub fn words(&self) -> Vec<Word> {
        self.evaluators()
            .map(|e| Word::new(&e.name, e.fixity.token_kind()))
            .collect()
    }
}
