//! # Calculator expression engine
//!
//! The library turns an expression like `2 + sin(30) * 3!` into a number in
//! three steps: the text is split into tokens, the tokens are rearranged
//! into postfix order with the shunting-yard algorithm, and the postfix
//! sequence is reduced to a single value. Problems found on the way (an
//! unknown character, an unclosed bracket, an operator without operands)
//! never stop the evaluation with an error: they are collected as
//! diagnostics next to the best result that could be computed.
//!
//! Numbers keep the most exact type possible. The list of number types
//! starting from the lowest:
//! * Big integer numbers
//! * Fractions: `1/3 + 1/6` is exactly `1/2`
//! * Float numbers, used whenever an exact result is impossible: `sqrt(2)`.
//!   They are arbitrary precision binary floats: the configured number of
//!   significant digits sets their mantissa size, and their range goes far
//!   beyond machine floats (`10^400 + 0.5` is finite)
//! * Special values: `inf`, `-inf` and `nan`. Division by zero or logarithm
//!   of zero do not fail, they give the limit: `1/0` is `inf`, `log(0)` is `-inf`
//!
//! If two numbers have different types, the lower one is converted to the
//! higher type. Results are never converted back: `6/3` is the fraction `2/1`.
//!
//! Operators (starting from highest priority):
//! * functions
//! * `!` - factorial (after a number or closing bracket)
//! * `-`, `+` - unary minus and plus
//! * `^` - power, right associative
//! * `*`, `/`, `mod` - multiplication, division, modulo
//! * `+`, `-` - addition, subtraction
//!
//! The list of supported functions:
//! * trigonometric functions: sin, cos, tan. The argument unit is set by
//!   [`config::AngleMode`]; in degrees and gradients multiples of a right
//!   angle give exact values: `sin(90)` is `1`, `tan(90)` and `tan(90.0)`
//!   are `nan`
//! * logarithms: log (decimal, exact for powers of ten) and ln
//! * roots: sqrt and cbrt, exact for perfect squares and cubes
//! * absolute value: abs
//!
//! More operators and functions can be added to a [`parse::Parser`] at
//! runtime with [`registry::Evaluator`] records.
//!
//! Number literals are read in the current base (binary, octal, decimal, or
//! hexadecimal) and may have a radix point in any base: `A.8` in hex is `10.5`.

pub mod config;
pub mod errors;
pub mod number;
pub mod parse;
pub mod registry;
pub mod stack;
pub mod token;

pub use config::{AngleMode, EvalConfig, NumBase};
pub use errors::{CalcError, Diagnostic, DiagnosticKind};
pub use number::{Number, Special};
pub use parse::{eval, Parser};
pub use stack::Evaluation;
