use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Num, One, Signed, ToPrimitive, Zero};
use rug::float::Constant;
use rug::integer::Order;
use rug::ops::Pow;
use rug::Float;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::config::{AngleMode, NumBase, MIN_FLOAT_BITS};
use crate::errors::*;

/// Result of the fallible text constructors
pub type NumberResult = Result<Number, CalcError>;

/// Largest argument the factorial is computed for. Anything above it is
/// reported as undefined instead of hanging the caller.
pub const MAX_FACTORIAL: u64 = 10_000;

/// Largest decimal exponent [`Number::from_str_fraction`] accepts
pub const MAX_FRACTION_EXPONENT: u64 = 100_000;

// larger integer exponents are computed with floats
const MAX_EXACT_EXPONENT: u32 = 1_000_000;

// exact powers longer than this many bits are computed with floats
const MAX_EXACT_BITS: u64 = 1 << 22;

/// Values that are not numbers in the usual sense. They take part in the
/// arithmetic like IEEE infinities and NaN do, but are tagged explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    Infinity,
    MinusInfinity,
    Undefined,
}

impl Special {
    fn sign(self) -> i32 {
        match self {
            Special::Infinity => 1,
            Special::MinusInfinity => -1,
            Special::Undefined => 0,
        }
    }

    // positive -> inf, negative -> -inf, zero -> undefined
    fn from_sign(sign: i32) -> Special {
        match sign.cmp(&0) {
            Ordering::Greater => Special::Infinity,
            Ordering::Less => Special::MinusInfinity,
            Ordering::Equal => Special::Undefined,
        }
    }

    fn negate(self) -> Special {
        Special::from_sign(-self.sign())
    }

    fn add(self, rhs: Special) -> Special {
        if self == Special::Undefined || rhs == Special::Undefined || self.sign() + rhs.sign() == 0 {
            Special::Undefined
        } else {
            self
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Special::Infinity => "inf",
            Special::MinusInfinity => "-inf",
            Special::Undefined => "nan",
        }
    }
}

/// A calculator value.
///
/// Integers and fractions are exact and unbounded, floats are used whenever a
/// result cannot be represented exactly. A float carries its own mantissa
/// size, so its range and digit count are only limited by memory. Mixed
/// operations promote the poorer operand (`Integer` < `Fraction` < `Float`)
/// and a `Special` operand takes over the whole operation. Results are never
/// demoted: `6/3` is the fraction `2/1`, `2.0 * 3` is the float `6.0`.
#[derive(Debug, Clone)]
pub enum Number {
    Integer(BigInt),
    /// Always canonical: positive denominator, coprime numerator
    Fraction(BigRational),
    /// Always finite: infinities and NaN become `Special`
    Float(Float),
    Special(Special),
}

fn digits_to_bits(digits: usize) -> u32 {
    ((digits as f64) * std::f64::consts::LOG2_10).ceil() as u32
}

// printf's %g: `digits` significant digits, scientific notation only for
// exponents below -4 or not below `digits`, no trailing zeros. With
// `mark_float` a whole value keeps a `.0` so that it reads back as a float
fn format_float(f: &Float, digits: usize, mark_float: bool) -> String {
    let (negative, text, exp) = f.to_sign_string_exp(10, Some(digits.max(1)));
    let exp = match exp {
        Some(e) => e - 1,
        None if mark_float => return "0.0".to_string(),
        None => return "0".to_string(),
    };
    let mantissa = text.trim_end_matches('0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if exp < -4 || exp >= digits as i32 {
        let (first, rest) = mantissa.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let sign = if exp < 0 { '-' } else { '+' };
        out.push_str(&format!("e{}{:02}", sign, exp.abs()));
        return out;
    }

    if exp < 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-exp - 1) as usize));
        out.push_str(mantissa);
        return out;
    }
    let int_len = exp as usize + 1;
    if mantissa.len() > int_len {
        let (int_part, frac_part) = mantissa.split_at(int_len);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    } else {
        out.push_str(mantissa);
        out.extend(std::iter::repeat('0').take(int_len - mantissa.len()));
        if mark_float {
            out.push_str(".0");
        }
    }
    out
}

fn to_rug_integer(i: &BigInt) -> rug::Integer {
    let (sign, digits) = i.to_bytes_le();
    let magnitude = rug::Integer::from_digits(&digits, Order::Lsf);
    if sign == Sign::Minus {
        -magnitude
    } else {
        magnitude
    }
}

fn from_rug_integer(i: &rug::Integer) -> BigInt {
    let sign = match i.cmp0() {
        Ordering::Less => Sign::Minus,
        Ordering::Equal => Sign::NoSign,
        Ordering::Greater => Sign::Plus,
    };
    BigInt::from_bytes_le(sign, &i.to_digits::<u8>(Order::Lsf))
}

fn to_rug_rational(r: &BigRational) -> rug::Rational {
    rug::Rational::from((to_rug_integer(r.numer()), to_rug_integer(r.denom())))
}

fn int_to_float(i: &BigInt, prec: u32) -> Float {
    Float::with_val(prec, &to_rug_integer(i))
}

fn ratio_to_float(r: &BigRational, prec: u32) -> Float {
    Float::with_val(prec, &to_rug_rational(r))
}

fn int_to_f64(i: &BigInt) -> f64 {
    match i.to_f64() {
        Some(f) => f,
        None if i.is_negative() => f64::NEG_INFINITY,
        None => f64::INFINITY,
    }
}

fn ratio_to_f64(r: &BigRational) -> f64 {
    if let Some(f) = r.to_f64() {
        return f;
    }
    // extract the integer part first to avoid float overflow
    // in case of very long numer and denom
    let fract = r.fract();
    int_to_f64(&r.to_integer()) + int_to_f64(fract.numer()) / int_to_f64(fract.denom())
}

fn strip_separators(s: &str) -> String {
    s.trim().replace('_', "").replace(' ', "")
}

// Integer and Fraction only, the callers have already dispatched the other
// variants
fn exact_ratio(n: Number) -> BigRational {
    match n {
        Number::Integer(i) => BigRational::from_integer(i),
        Number::Fraction(r) => r,
        _ => BigRational::zero(), // unreachable
    }
}

// both operands as floats with the mantissa size of the larger float operand
fn float_operands(n1: &Number, n2: &Number) -> (Float, Float, u32) {
    let prec = n1.float_prec().max(n2.float_prec()).unwrap_or(MIN_FLOAT_BITS);
    (n1.to_big_float(prec), n2.to_big_float(prec), prec)
}

fn exact_root(n: &BigInt, degree: u32) -> Option<BigInt> {
    if n.is_negative() {
        if degree % 2 == 0 {
            return None;
        }
        return exact_root(&-n, degree).map(|r| -r);
    }
    let r = n.nth_root(degree);
    if r.pow(degree) == *n {
        Some(r)
    } else {
        None
    }
}

fn is_power_of_ten(n: &BigInt) -> Option<i64> {
    if !n.is_positive() {
        return None;
    }
    let digits = n.to_str_radix(10);
    let (first, rest) = digits.split_at(1);
    if first == "1" && rest.chars().all(|c| c == '0') {
        Some(rest.len() as i64)
    } else {
        None
    }
}

// true if `x` is an odd integer up to the rounding of its last bits
fn is_nearly_odd(x: &Float) -> bool {
    let n = x.clone().round();
    if !n.to_integer().map_or(false, |i| i.is_odd()) {
        return false;
    }
    let diff = Float::with_val(x.prec(), x - &n);
    match (diff.get_exp(), x.get_exp()) {
        (None, _) => true,
        (Some(d), Some(e)) => d < e - x.prec() as i32 + 4,
        _ => false,
    }
}

// |base|^exp with the sign of an odd root of a negative base restored
fn float_power(base: Float, exp: Float) -> Number {
    if base.cmp0() == Some(Ordering::Less) && !exp.is_integer() {
        if is_nearly_odd(&exp.clone().recip()) {
            return Number::from_big_float(base.abs().pow(&exp)).negate();
        }
        return Number::UNDEFINED;
    }
    Number::from_big_float(base.pow(&exp))
}

fn to_radians(angle: Float, mode: AngleMode) -> Float {
    match mode.full_turn() {
        Some(turn) => {
            let prec = angle.prec();
            let pi = Float::with_val(prec, Constant::Pi);
            angle * pi / Float::with_val(prec, turn / 2)
        }
        None => angle,
    }
}

// a trigonometric result that is zero up to the rounding of a non-tiny
// argument
fn is_rounding_zero(r: &Float, angle: &Float) -> bool {
    let limit = 4 - r.prec() as i32;
    match (r.get_exp(), angle.get_exp()) {
        (Some(e), Some(a)) => a >= 1 && e < limit,
        _ => false,
    }
}

macro_rules! promoted_op {
    ($id:ident, $op:tt) => {
        fn $id(self, rhs: Number) -> Number {
            match (self, rhs) {
                (n1 @ Number::Float(..), n2) | (n1, n2 @ Number::Float(..)) => {
                    let (f1, f2, prec) = float_operands(&n1, &n2);
                    Number::from_big_float(Float::with_val(prec, &f1 $op &f2))
                }
                (Number::Integer(i1), Number::Integer(i2)) => Number::Integer(i1 $op i2),
                (n1, n2) => Number::Fraction(exact_ratio(n1) $op exact_ratio(n2)),
            }
        }
    };
}

macro_rules! quarter_turn_op {
    ($id:ident, $table:expr, $fallback:ident) => {
        /// A whole number of quarter turns in degrees or gradients gives an
        /// exact value. `prec` is the mantissa size used for an exact
        /// argument.
        pub fn $id(&self, mode: AngleMode, prec: u32) -> Number {
            if self.is_special() {
                return Number::UNDEFINED;
            }
            if let Some(quarter) = self.quarter_turns(mode) {
                let exact: Number = $table[quarter].clone();
                return match self {
                    Number::Float(f) => Number::from_big_float(exact.to_big_float(f.prec())),
                    _ => exact,
                };
            }
            let angle = to_radians(self.to_big_float(self.float_prec().unwrap_or(prec)), mode);
            let r = angle.clone().$fallback();
            if is_rounding_zero(&r, &angle) {
                Number::Float(Float::new(r.prec()))
            } else {
                Number::from_big_float(r)
            }
        }
    };
}

impl Default for Number {
    fn default() -> Number {
        Number::Integer(BigInt::zero())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_text(0))
    }
}

/// Variant-exact comparison: `Integer(2)` and `Fraction(2/1)` differ, and
/// `Undefined` equals itself. Use [`Number::compare`] for numeric ordering.
impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Integer(i1), Number::Integer(i2)) => i1 == i2,
            (Number::Fraction(r1), Number::Fraction(r2)) => r1 == r2,
            (Number::Float(f1), Number::Float(f2)) => f1 == f2,
            (Number::Special(s1), Number::Special(s2)) => s1 == s2,
            (_, _) => false,
        }
    }
}

impl From<i32> for Number {
    fn from(i: i32) -> Number {
        Number::Integer(BigInt::from(i))
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Number {
        Number::Integer(BigInt::from(i))
    }
}

impl From<u64> for Number {
    fn from(i: u64) -> Number {
        Number::Integer(BigInt::from(i))
    }
}

impl From<BigInt> for Number {
    fn from(i: BigInt) -> Number {
        Number::Integer(i)
    }
}

impl From<BigRational> for Number {
    fn from(r: BigRational) -> Number {
        Number::Fraction(r)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Number {
        Number::float(f)
    }
}

impl From<Float> for Number {
    fn from(f: Float) -> Number {
        Number::from_big_float(f)
    }
}

impl From<Special> for Number {
    fn from(s: Special) -> Number {
        Number::Special(s)
    }
}

impl FromStr for Number {
    type Err = CalcError;

    fn from_str(s: &str) -> NumberResult {
        Number::parse(s)
    }
}

impl Number {
    pub const INFINITY: Number = Number::Special(Special::Infinity);
    pub const MINUS_INFINITY: Number = Number::Special(Special::MinusInfinity);
    pub const UNDEFINED: Number = Number::Special(Special::Undefined);

    /// Wraps a machine float into a float of [`MIN_FLOAT_BITS`] bits.
    /// Infinities and NaN become the matching special value
    pub fn float(f: f64) -> Number {
        Number::from_big_float(Float::with_val(MIN_FLOAT_BITS, f))
    }

    /// Wraps a float, turning infinities and NaN into the matching special
    /// value
    pub fn from_big_float(f: Float) -> Number {
        if f.is_nan() {
            Number::UNDEFINED
        } else if f.is_infinite() {
            if f.is_sign_positive() {
                Number::INFINITY
            } else {
                Number::MINUS_INFINITY
            }
        } else {
            Number::Float(f)
        }
    }

    /// Builds a canonical fraction. A zero denominator gives the limit
    /// instead of failing: `n/0` is an infinity, `0/0` is undefined.
    pub fn fraction(numer: BigInt, denom: BigInt) -> Number {
        if denom.is_zero() {
            let sign = if numer.is_positive() {
                1
            } else if numer.is_negative() {
                -1
            } else {
                0
            };
            return Number::Special(Special::from_sign(sign));
        }
        Number::Fraction(BigRational::new(numer, denom))
    }

    // mantissa size of a float, nothing for the other variants
    fn float_prec(&self) -> Option<u32> {
        match self {
            Number::Float(f) => Some(f.prec()),
            _ => None,
        }
    }

    // the value as a float of `prec` bits, specials become infinities and NaN
    fn to_big_float(&self, prec: u32) -> Float {
        match self {
            Number::Integer(i) => int_to_float(i, prec),
            Number::Fraction(r) => ratio_to_float(r, prec),
            Number::Float(f) => Float::with_val(prec, f),
            Number::Special(Special::Infinity) => Float::with_val(prec, f64::INFINITY),
            Number::Special(Special::MinusInfinity) => Float::with_val(prec, f64::NEG_INFINITY),
            Number::Special(Special::Undefined) => Float::with_val(prec, f64::NAN),
        }
    }

    //---------------------------------------------

    /// Convert a digit string in the given base to an integer.
    /// A leading sign is accepted, digits can be separated with
    /// underscores: `3_00_1` is the same as `3001`
    pub fn from_str_integer(s: &str, base: NumBase) -> NumberResult {
        let st = strip_separators(s);
        let digits = st.strip_prefix('+').unwrap_or(&st);
        match BigInt::from_str_radix(digits, base.radix()) {
            Ok(i) => Ok(Number::Integer(i)),
            Err(..) => Err(CalcError::StrToInt(s.to_owned())),
        }
    }

    /// Convert &str to an exact fraction.
    /// Supported formats:
    /// * Numerator and denominator: `3/4`, `-6/8` (stored as `-3/4`)
    /// * Decimal number, converted without rounding: `1.25` = `5/4`
    /// * Decimal number with exponent: `1.25e-1` = `1/8`. The exponent
    ///   (after moving the decimal point) must not exceed
    ///   [`MAX_FRACTION_EXPONENT`] in magnitude
    pub fn from_str_fraction(s: &str) -> NumberResult {
        let st = strip_separators(s);
        let err = || CalcError::StrToFraction(s.to_owned());

        if let Some((n, d)) = st.split_once('/') {
            let n: BigInt = n.parse().map_err(|_| err())?;
            let d: BigInt = d.parse().map_err(|_| err())?;
            if d.is_zero() {
                return Err(err());
            }
            return Ok(Number::Fraction(BigRational::new(n, d)));
        }

        let lower = st.to_lowercase();
        let (mantissa, exp) = match lower.split_once('e') {
            Some((m, e)) => (m, e.parse::<i64>().map_err(|_| err())?),
            None => (lower.as_str(), 0),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !frac_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let scale = exp
            .checked_sub(frac_part.len() as i64)
            .filter(|s| s.unsigned_abs() <= MAX_FRACTION_EXPONENT)
            .ok_or_else(err)?;
        let digits = format!("{}{}", int_part, frac_part);
        let numer: BigInt = digits.parse().map_err(|_| err())?;
        let ten = BigInt::from(10);
        let power = scale.unsigned_abs().to_u32().ok_or_else(err)?;
        let r = if scale >= 0 {
            BigRational::from_integer(numer * ten.pow(power))
        } else {
            BigRational::new(numer, ten.pow(power))
        };
        Ok(Number::Fraction(r))
    }

    /// Convert &str to float number
    /// Supported formats:
    /// * Without exponent - `1.023`
    /// * With exponent - `1.02e-5`
    ///
    /// The float gets enough bits for every digit of the text, and at least
    /// [`MIN_FLOAT_BITS`].
    pub fn from_str_float(s: &str) -> NumberResult {
        let st = strip_separators(s);
        let err = || CalcError::StrToFloat(s.to_owned());
        let mantissa = st.split(|c| c == 'e' || c == 'E').next().unwrap_or("");
        let digits = mantissa.chars().filter(char::is_ascii_digit).count();
        let prec = digits_to_bits(digits).max(MIN_FLOAT_BITS);

        let parsed = Float::parse(&st).map_err(|_| err())?;
        let f = Float::with_val(prec, parsed);
        if f.is_nan() {
            return Err(err());
        }
        Ok(Number::from_big_float(f))
    }

    /// Convert one of the literals `nan`, `inf`, `+inf`, `-inf` to a special
    /// value
    pub fn from_str_special(s: &str) -> NumberResult {
        match s.trim().to_lowercase().as_str() {
            "nan" => Ok(Number::UNDEFINED),
            "inf" | "+inf" => Ok(Number::INFINITY),
            "-inf" => Ok(Number::MINUS_INFINITY),
            _ => Err(CalcError::StrToSpecial(s.to_owned())),
        }
    }

    /// Reads any text produced by [`Number::to_text`] back:
    /// * `nan`, `inf`, `-inf` - special values
    /// * `n/d` - fraction
    /// * `1.5`, `2e10` - float
    /// * `0x1f`, `0o17`, `0b101` - integer in the given base
    /// * anything else - decimal integer
    pub fn parse(s: &str) -> NumberResult {
        let st = s.trim();
        if let Ok(n) = Number::from_str_special(st) {
            return Ok(n);
        }
        if st.contains('/') {
            return Number::from_str_fraction(st);
        }

        let (negative, unsigned) = match st.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, st.strip_prefix('+').unwrap_or(st)),
        };
        let prefixed = [("0x", NumBase::Hexadecimal), ("0o", NumBase::Octal), ("0b", NumBase::Binary)]
            .iter()
            .find(|(p, _)| {
                unsigned.len() > p.len()
                    && unsigned.get(..p.len()).map_or(false, |head| head.eq_ignore_ascii_case(p))
            });
        if let Some((prefix, base)) = prefixed {
            let n = Number::from_str_integer(&unsigned[prefix.len()..], *base)
                .map_err(|_| CalcError::StrToInt(s.to_owned()))?;
            return Ok(if negative { n.negate() } else { n });
        }

        if st.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
            return Number::from_str_float(st);
        }
        Number::from_str_integer(st, NumBase::Decimal)
    }

    /// Reads a number literal as produced by the tokenizer: digits of `base`
    /// optionally followed by `decimal_point` and more digits. Literals
    /// without a radix point are integers, the others are floats of `prec`
    /// bits rounded from the exact value.
    pub fn from_literal(s: &str, base: NumBase, decimal_point: char, prec: u32) -> NumberResult {
        let (int_part, frac_part) = match s.split_once(decimal_point) {
            Some(parts) => parts,
            None => return Number::from_str_integer(s, base),
        };
        let err = || CalcError::StrToFloat(s.to_owned());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }

        let radix = BigInt::from(base.radix());
        let int_value = if int_part.is_empty() {
            BigInt::zero()
        } else {
            BigInt::from_str_radix(int_part, base.radix()).map_err(|_| err())?
        };
        let mut value = BigRational::from_integer(int_value);
        if !frac_part.is_empty() {
            let frac_value = BigInt::from_str_radix(frac_part, base.radix()).map_err(|_| err())?;
            let scale = radix.pow(frac_part.len() as u32);
            value += BigRational::new(frac_value, scale);
        }
        Ok(Number::from_big_float(ratio_to_float(&value, prec)))
    }

    /// Text form of the value. `precision` is the number of significant
    /// digits of a float. `0` or less prints every digit the mantissa size
    /// guarantees, and keeps a `.0` on whole values so that the text reads
    /// back as a float. Exact values ignore it.
    pub fn to_text(&self, precision: i32) -> String {
        match self {
            Number::Integer(i) => i.to_string(),
            Number::Fraction(r) => format!("{}/{}", r.numer(), r.denom()),
            Number::Float(f) => {
                if precision <= 0 {
                    let digits = (f.prec() as f64 * std::f64::consts::LOG10_2).floor() as usize;
                    format_float(f, digits, true)
                } else {
                    format_float(f, precision as usize, false)
                }
            }
            Number::Special(s) => s.as_str().to_string(),
        }
    }

    //---------------------------------------------

    pub fn is_special(&self) -> bool {
        matches!(self, Number::Special(..))
    }

    /// Returns true if the value is zero
    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => i.is_zero(),
            Number::Fraction(r) => r.is_zero(),
            Number::Float(f) => f.is_zero(),
            Number::Special(..) => false,
        }
    }

    /// Returns true if the value has no fractional part, whatever its variant
    pub fn is_integer(&self) -> bool {
        match self {
            Number::Integer(..) => true,
            Number::Fraction(r) => r.is_integer(),
            Number::Float(f) => f.is_integer(),
            Number::Special(..) => false,
        }
    }

    /// `-1`, `0` or `1`. Undefined has no sign and returns `0`
    pub fn sign(&self) -> i32 {
        match self {
            Number::Integer(i) => i.signum().to_i32().unwrap_or(0),
            Number::Fraction(r) => {
                if r.is_zero() {
                    0
                } else if r.is_positive() {
                    1
                } else {
                    -1
                }
            }
            Number::Float(f) => match f.cmp0() {
                Some(Ordering::Greater) => 1,
                Some(Ordering::Less) => -1,
                _ => 0,
            },
            Number::Special(s) => s.sign(),
        }
    }

    /// Nearest machine float. Values beyond its range become infinities
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => int_to_f64(i),
            Number::Fraction(r) => ratio_to_f64(r),
            Number::Float(f) => f.to_f64(),
            Number::Special(Special::Infinity) => f64::INFINITY,
            Number::Special(Special::MinusInfinity) => f64::NEG_INFINITY,
            Number::Special(Special::Undefined) => f64::NAN,
        }
    }

    /// Truncates towards zero. Values that do not fit and special values
    /// give `0`
    pub fn to_i64(&self) -> i64 {
        match self {
            Number::Integer(i) => i.to_i64().unwrap_or(0),
            Number::Fraction(r) => r.to_integer().to_i64().unwrap_or(0),
            Number::Float(f) => f.clone().trunc().to_integer().and_then(|i| i.to_i64()).unwrap_or(0),
            Number::Special(..) => 0,
        }
    }

    /// Numeric ordering across variants. Infinity is above everything but
    /// itself, minus infinity below everything, undefined only equals itself
    /// and sorts above finite values.
    pub fn compare(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Special(s1), Number::Special(s2)) => {
                if s1 == s2 {
                    Ordering::Equal
                } else {
                    match (s1, s2) {
                        (Special::Infinity, _) | (_, Special::MinusInfinity) => Ordering::Greater,
                        _ => Ordering::Less,
                    }
                }
            }
            (Number::Special(Special::MinusInfinity), _) => Ordering::Less,
            (Number::Special(..), _) => Ordering::Greater,
            (_, Number::Special(..)) => other.compare(self).reverse(),
            (Number::Float(f1), Number::Float(f2)) => f1.partial_cmp(f2).unwrap_or(Ordering::Equal),
            (Number::Float(f), n) => {
                let exact = to_rug_rational(&exact_ratio(n.clone()));
                f.partial_cmp(&exact).unwrap_or(Ordering::Equal)
            }
            (_, Number::Float(..)) => other.compare(self).reverse(),
            (Number::Integer(i1), Number::Integer(i2)) => i1.cmp(i2),
            (n1, n2) => exact_ratio(n1.clone()).cmp(&exact_ratio(n2.clone())),
        }
    }

    //---------------------------------------------

    promoted_op!(add_finite, +);
    promoted_op!(subtract_finite, -);
    promoted_op!(multiply_finite, *);

    pub fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Special(s1), Number::Special(s2)) => Number::Special(s1.add(s2)),
            (Number::Special(s), _) | (_, Number::Special(s)) => Number::Special(s),
            (n1, n2) => n1.add_finite(n2),
        }
    }

    pub fn subtract(self, rhs: Number) -> Number {
        match (self, rhs) {
            (n1 @ Number::Special(..), n2) | (n1, n2 @ Number::Special(..)) => n1.add(n2.negate()),
            (n1, n2) => n1.subtract_finite(n2),
        }
    }

    pub fn multiply(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Special(s1), Number::Special(s2)) => {
                if s1 == Special::Undefined || s2 == Special::Undefined {
                    Number::UNDEFINED
                } else {
                    Number::Special(Special::from_sign(s1.sign() * s2.sign()))
                }
            }
            (Number::Special(s), n) | (n, Number::Special(s)) => {
                // `from_sign` maps an undefined or zero factor to undefined
                Number::Special(Special::from_sign(s.sign() * n.sign()))
            }
            (n1, n2) => n1.multiply_finite(n2),
        }
    }

    /// `1/x`: exact values give fractions, zero gives infinity and the
    /// infinities give zero
    pub fn reciprocal(self) -> Number {
        if self.is_zero() {
            return Number::INFINITY;
        }
        match self {
            Number::Integer(i) => Number::Fraction(BigRational::new(BigInt::one(), i)),
            Number::Fraction(r) => Number::Fraction(r.recip()),
            Number::Float(f) => Number::from_big_float(f.recip()),
            Number::Special(Special::Undefined) => Number::UNDEFINED,
            Number::Special(..) => Number::Integer(BigInt::zero()),
        }
    }

    /// Division of two integers is exact and gives a fraction even when the
    /// quotient is whole. Dividing by zero gives a signed infinity, `0/0`
    /// is undefined.
    pub fn divide(self, rhs: Number) -> Number {
        if rhs.is_zero() || self.is_special() || rhs.is_special() {
            return self.multiply(rhs.reciprocal());
        }
        match (self, rhs) {
            (n1 @ Number::Float(..), n2) | (n1, n2 @ Number::Float(..)) => {
                let (f1, f2, prec) = float_operands(&n1, &n2);
                Number::from_big_float(Float::with_val(prec, &f1 / &f2))
            }
            (n1, n2) => Number::Fraction(exact_ratio(n1) / exact_ratio(n2)),
        }
    }

    /// Divides and truncates the result towards zero. Exact operands give an
    /// integer, a float operand keeps the result a float.
    pub fn integer_division(self, rhs: Number) -> Number {
        if rhs.is_zero() || self.is_special() || rhs.is_special() {
            return Number::UNDEFINED;
        }
        match (self, rhs) {
            (n1 @ Number::Float(..), n2) | (n1, n2 @ Number::Float(..)) => {
                let (f1, f2, prec) = float_operands(&n1, &n2);
                Number::from_big_float(Float::with_val(prec, &f1 / &f2).trunc())
            }
            (Number::Integer(i1), Number::Integer(i2)) => Number::Integer(i1 / i2),
            (n1, n2) => Number::Integer((exact_ratio(n1) / exact_ratio(n2)).trunc().to_integer()),
        }
    }

    /// Remainder that is never negative, as in `mpz_mod`: the sign of the
    /// divisor is ignored. Modulus by zero is undefined.
    pub fn modulo(self, rhs: Number) -> Number {
        if rhs.is_zero() || self.is_special() || rhs.is_special() {
            return Number::UNDEFINED;
        }
        match (self, rhs) {
            (n1 @ Number::Float(..), n2) | (n1, n2 @ Number::Float(..)) => {
                let (f1, f2, prec) = float_operands(&n1, &n2);
                let divisor = f2.abs();
                let quotient = Float::with_val(prec, &f1 / &divisor).floor();
                Number::from_big_float(f1 - quotient * divisor)
            }
            (Number::Integer(i1), Number::Integer(i2)) => Number::Integer(i1.mod_floor(&i2.abs())),
            (n1, n2) => {
                let r1 = exact_ratio(n1);
                let r2 = exact_ratio(n2).abs();
                let q = (&r1 / &r2).floor();
                Number::Fraction(r1 - r2 * q)
            }
        }
    }

    /// Inverts the sign of the value
    pub fn negate(self) -> Number {
        match self {
            Number::Integer(i) => Number::Integer(-i),
            Number::Fraction(r) => Number::Fraction(-r),
            Number::Float(f) => Number::Float(-f),
            Number::Special(s) => Number::Special(s.negate()),
        }
    }

    /// Returns absolute value of a number
    pub fn abs(self) -> Number {
        match self {
            Number::Integer(i) => Number::Integer(i.abs()),
            Number::Fraction(r) => Number::Fraction(r.abs()),
            Number::Float(f) => Number::Float(f.abs()),
            Number::Special(Special::MinusInfinity) => Number::INFINITY,
            Number::Special(s) => Number::Special(s),
        }
    }

    //---------------------------------------------

    /// Square root. Perfect squares (of integers, or of both parts of a
    /// fraction) stay exact, anything else becomes a float of `prec` bits.
    /// Negative values have no square root and give undefined.
    pub fn sqrt(self, prec: u32) -> Number {
        if self.sign() < 0 {
            return Number::UNDEFINED;
        }
        match self {
            Number::Integer(i) => match exact_root(&i, 2) {
                Some(r) => Number::Integer(r),
                None => Number::from_big_float(int_to_float(&i, prec).sqrt()),
            },
            Number::Fraction(r) => match (exact_root(r.numer(), 2), exact_root(r.denom(), 2)) {
                (Some(n), Some(d)) => Number::Fraction(BigRational::new(n, d)),
                _ => Number::from_big_float(ratio_to_float(&r, prec).sqrt()),
            },
            Number::Float(f) => Number::from_big_float(f.sqrt()),
            Number::Special(s) => Number::Special(s),
        }
    }

    /// Cubic root, exact for perfect cubes including negative ones
    pub fn cbrt(self, prec: u32) -> Number {
        match self {
            Number::Integer(i) => match exact_root(&i, 3) {
                Some(r) => Number::Integer(r),
                None => Number::from_big_float(int_to_float(&i, prec).cbrt()),
            },
            Number::Fraction(r) => match (exact_root(r.numer(), 3), exact_root(r.denom(), 3)) {
                (Some(n), Some(d)) => Number::Fraction(BigRational::new(n, d)),
                _ => Number::from_big_float(ratio_to_float(&r, prec).cbrt()),
            },
            Number::Float(f) => Number::from_big_float(f.cbrt()),
            Number::Special(s) => Number::Special(s),
        }
    }

    // exact power with an integer exponent; `None` when the exponent or the
    // size of the result is too large and a float has to be used
    fn exact_powi(base: &Number, exp: &BigInt) -> Option<Number> {
        let e = exp.abs().to_u32().filter(|e| *e <= MAX_EXACT_EXPONENT)?;
        let bits = match base {
            Number::Integer(i) => i.bits(),
            Number::Fraction(r) => r.numer().bits().max(r.denom().bits()),
            _ => return None,
        };
        if bits.saturating_mul(u64::from(e)) > MAX_EXACT_BITS {
            return None;
        }
        let raised = match base {
            Number::Integer(i) => Number::Integer(i.pow(e)),
            Number::Fraction(r) => {
                Number::Fraction(BigRational::new(r.numer().pow(e), r.denom().pow(e)))
            }
            _ => return None,
        };
        if exp.is_negative() {
            Some(raised.reciprocal())
        } else {
            Some(raised)
        }
    }

    // base^(p/q) for an exact base: take the q-th root exactly if possible,
    // then raise to p
    fn exact_rational_power(base: Number, exp: &BigRational, prec: u32) -> Number {
        let float_result = |base: &Number| {
            let b = base.to_big_float(prec);
            let e = ratio_to_float(exp, prec);
            if b.cmp0() == Some(Ordering::Less) {
                // only odd roots reach this point
                let magnitude = Number::from_big_float(b.abs().pow(&e));
                if exp.numer().is_odd() {
                    magnitude.negate()
                } else {
                    magnitude
                }
            } else {
                Number::from_big_float(b.pow(&e))
            }
        };

        if base.sign() < 0 && exp.denom().is_even() {
            return Number::UNDEFINED;
        }
        let degree = match exp.denom().to_u32() {
            Some(d) => d,
            None => return float_result(&base),
        };
        let root = match &base {
            Number::Integer(i) => exact_root(i, degree).map(Number::Integer),
            Number::Fraction(r) => match (exact_root(r.numer(), degree), exact_root(r.denom(), degree)) {
                (Some(n), Some(d)) => Some(Number::Fraction(BigRational::new(n, d))),
                _ => None,
            },
            _ => None,
        };
        match root.and_then(|r| Number::exact_powi(&r, exp.numer())) {
            Some(n) => n,
            None => float_result(&base),
        }
    }

    /// Raises a number into arbitrary power.
    /// Integer exponents are exact. Fractional exponents are exact when the
    /// root is, so `(-8)^(1/3)` is `-2`: a negative base is allowed when the
    /// root degree is odd. Everything else, including exact results too
    /// large to hold, is computed with floats of `prec` bits.
    pub fn power(self, exp: Number, prec: u32) -> Number {
        match (self, exp) {
            (Number::Special(Special::Undefined), _) | (_, Number::Special(Special::Undefined)) => {
                Number::UNDEFINED
            }
            (Number::Special(s), e) => match e.sign() {
                0 => Number::Integer(BigInt::one()),
                -1 => Number::Integer(BigInt::zero()),
                _ if s == Special::Infinity => Number::INFINITY,
                _ if !e.is_integer() => Number::UNDEFINED,
                _ => {
                    let odd = match &e {
                        Number::Integer(i) => i.is_odd(),
                        Number::Fraction(r) => r.to_integer().is_odd(),
                        Number::Float(f) => f.to_integer().map_or(false, |i| i.is_odd()),
                        Number::Special(..) => false,
                    };
                    if odd {
                        Number::MINUS_INFINITY
                    } else {
                        Number::INFINITY
                    }
                }
            },
            (b, e @ Number::Special(..)) => {
                let p = b.float_prec().unwrap_or(prec);
                Number::from_big_float(b.to_big_float(p).pow(&e.to_big_float(p)))
            }
            (b @ Number::Float(..), e) | (b, e @ Number::Float(..)) => {
                let (fb, fe, _) = float_operands(&b, &e);
                float_power(fb, fe)
            }
            (b, Number::Integer(e)) => match Number::exact_powi(&b, &e) {
                Some(n) => n,
                None => Number::from_big_float(b.to_big_float(prec).pow(&int_to_float(&e, prec))),
            },
            (b, Number::Fraction(e)) => Number::exact_rational_power(b, &e, prec),
        }
    }

    /// Factorial of a non-negative whole number. The result is always an
    /// integer, even for a whole float argument. Negative and non-whole
    /// arguments are undefined.
    pub fn factorial(self) -> Number {
        match self {
            Number::Special(Special::Infinity) => return Number::INFINITY,
            Number::Special(..) => return Number::UNDEFINED,
            _ => {}
        }
        if self.sign() < 0 || !self.is_integer() {
            return Number::UNDEFINED;
        }
        let n = match &self {
            Number::Integer(i) => i.to_u64(),
            Number::Fraction(r) => r.to_integer().to_u64(),
            Number::Float(f) => f.to_integer().and_then(|i| i.to_u64()),
            Number::Special(..) => None,
        };
        match n {
            Some(n) if n <= MAX_FACTORIAL => {
                let mut res = BigInt::one();
                for k in 2..=n {
                    res *= k;
                }
                Number::Integer(res)
            }
            _ => Number::UNDEFINED,
        }
    }

    //---------------------------------------------

    // how many quarter turns a whole or exact angle is, if it is a whole
    // number of them
    fn quarter_turns(&self, mode: AngleMode) -> Option<usize> {
        let turn = mode.full_turn()?;
        let angle = match self {
            Number::Integer(i) => BigRational::from_integer(i.clone()),
            Number::Fraction(r) => r.clone(),
            // beyond its mantissa a float has no units digit to speak of
            Number::Float(f) if f.is_integer() && f.get_exp().map_or(true, |e| e <= f.prec() as i32) => {
                BigRational::from_integer(from_rug_integer(&f.to_integer()?))
            }
            _ => return None,
        };
        let quarters = angle * BigRational::from_integer(BigInt::from(4)) / BigRational::from_integer(BigInt::from(turn));
        if !quarters.is_integer() {
            return None;
        }
        quarters.to_integer().mod_floor(&BigInt::from(4)).to_usize()
    }

    quarter_turn_op!(
        sin,
        [Number::from(0), Number::from(1), Number::from(0), Number::from(-1)],
        sin
    );
    quarter_turn_op!(
        cos,
        [Number::from(1), Number::from(0), Number::from(-1), Number::from(0)],
        cos
    );
    quarter_turn_op!(
        tan,
        [Number::from(0), Number::UNDEFINED, Number::from(0), Number::UNDEFINED],
        tan
    );

    /// Natural logarithm. `ln(0)` is minus infinity, negative values are
    /// undefined
    pub fn ln(&self, prec: u32) -> Number {
        match self {
            Number::Special(Special::Infinity) => Number::INFINITY,
            Number::Special(..) => Number::UNDEFINED,
            n if n.is_zero() => Number::MINUS_INFINITY,
            n if n.sign() < 0 => Number::UNDEFINED,
            n => Number::from_big_float(n.to_big_float(n.float_prec().unwrap_or(prec)).ln()),
        }
    }

    /// Decimal logarithm. Exact for powers of ten: `log(1000)` is the
    /// integer `3`, `log(1/100)` is `-2`
    pub fn log10(&self, prec: u32) -> Number {
        match self {
            Number::Special(Special::Infinity) => return Number::INFINITY,
            Number::Special(..) => return Number::UNDEFINED,
            n if n.is_zero() => return Number::MINUS_INFINITY,
            n if n.sign() < 0 => return Number::UNDEFINED,
            _ => {}
        }
        match self {
            Number::Integer(i) => {
                if let Some(k) = is_power_of_ten(i) {
                    return Number::from(k);
                }
            }
            Number::Fraction(r) => {
                if r.numer().is_one() {
                    if let Some(k) = is_power_of_ten(r.denom()) {
                        return Number::from(-k);
                    }
                }
                if r.denom().is_one() {
                    if let Some(k) = is_power_of_ten(r.numer()) {
                        return Number::from(k);
                    }
                }
            }
            _ => {}
        }
        Number::from_big_float(self.to_big_float(self.float_prec().unwrap_or(prec)).log10())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u32 = MIN_FLOAT_BITS;

    fn int(i: i64) -> Number {
        Number::from(i)
    }

    fn frac(n: i64, d: i64) -> Number {
        Number::fraction(BigInt::from(n), BigInt::from(d))
    }

    fn float(f: f64) -> Number {
        Number::float(f)
    }

    fn close(n: &Number, expected: f64) -> bool {
        matches!(n, Number::Float(..)) && (n.to_f64() - expected).abs() < 1e-12
    }

    #[test]
    fn test_int_str() {
        let v = Number::from_str_integer("10002", NumBase::Decimal);
        assert_eq!(v, Ok(int(10002)));
        let v = Number::from_str_integer("10_00_2", NumBase::Decimal);
        assert_eq!(v, Ok(int(10002)));
        let v = Number::from_str_integer("-10002", NumBase::Decimal);
        assert_eq!(v, Ok(int(-10002)));
        let v = Number::from_str_integer("ff", NumBase::Hexadecimal);
        assert_eq!(v, Ok(int(255)));
        let v = Number::from_str_integer("FF", NumBase::Hexadecimal);
        assert_eq!(v, Ok(int(255)));
        let v = Number::from_str_integer("17", NumBase::Octal);
        assert_eq!(v, Ok(int(15)));
        let v = Number::from_str_integer("101", NumBase::Binary);
        assert_eq!(v, Ok(int(5)));
        assert!(Number::from_str_integer("102", NumBase::Binary).is_err());
        assert!(Number::from_str_integer("", NumBase::Decimal).is_err());
    }

    #[test]
    fn test_fraction_str() {
        assert_eq!(Number::from_str_fraction("1/2"), Ok(frac(1, 2)));
        assert_eq!(Number::from_str_fraction("-6/8"), Ok(frac(-3, 4)));
        assert_eq!(Number::from_str_fraction("6/-8"), Ok(frac(-3, 4)));
        assert_eq!(Number::from_str_fraction("1.25"), Ok(frac(5, 4)));
        assert_eq!(Number::from_str_fraction("1.25e-1"), Ok(frac(1, 8)));
        assert_eq!(Number::from_str_fraction("12e2"), Ok(frac(1200, 1)));
        assert_eq!(Number::from_str_fraction("-0.5"), Ok(frac(-1, 2)));
        assert!(Number::from_str_fraction("1/0").is_err());
        assert!(Number::from_str_fraction("1.2.3").is_err());
        assert!(Number::from_str_fraction("abc").is_err());
    }

    #[test]
    fn test_fraction_str_exponent_limit() {
        let v = Number::from_str_fraction("1e400000000");
        assert_eq!(v, Err(CalcError::StrToFraction("1e400000000".to_string())));
        assert!(Number::from_str_fraction("1e-400000000").is_err());
        assert!(Number::from_str_fraction("1e-9223372036854775808").is_err());
        // the digits after the point count towards the limit
        assert!(Number::from_str_fraction("0.5e100001").is_ok());
        assert!(Number::from_str_fraction("1e100001").is_err());

        let v = Number::from_str_fraction("1e100000").unwrap();
        assert_eq!(v.compare(&int(10).power(int(100_000), P)), Ordering::Equal);
    }

    #[test]
    fn test_float_str() {
        assert_eq!(Number::from_str_float("10002"), Ok(float(10002.0)));
        assert_eq!(Number::from_str_float("10_00_3.5"), Ok(float(10003.5)));
        assert_eq!(Number::from_str_float("1.0002e5"), Ok(float(100020.0)));
        assert_eq!(Number::from_str_float("200e-2"), Ok(float(2.0)));
        assert!(Number::from_str_float("1.2.3").is_err());
        assert!(Number::from_str_float("nan").is_err());

        // far outside the range of machine floats
        let v = Number::from_str_float("1e400").unwrap();
        assert!(matches!(v, Number::Float(..)));
        assert_eq!(v.to_text(5), "1e+400");

        // every digit of a long mantissa is kept
        let text = "1.2345678901234567890123456789012345678901234567890";
        let v = Number::from_str_float(text).unwrap();
        assert_eq!(v.to_text(50), "1.234567890123456789012345678901234567890123456789");
    }

    #[test]
    fn test_special_str() {
        assert_eq!(Number::from_str_special("nan"), Ok(Number::UNDEFINED));
        assert_eq!(Number::from_str_special("INF"), Ok(Number::INFINITY));
        assert_eq!(Number::from_str_special("-inf"), Ok(Number::MINUS_INFINITY));
        assert!(Number::from_str_special("infinity").is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Number::parse("42"), Ok(int(42)));
        assert_eq!(Number::parse(" -42 "), Ok(int(-42)));
        assert_eq!(Number::parse("0x1F"), Ok(int(31)));
        assert_eq!(Number::parse("-0b101"), Ok(int(-5)));
        assert_eq!(Number::parse("0o17"), Ok(int(15)));
        assert_eq!(Number::parse("3/6"), Ok(frac(1, 2)));
        assert_eq!(Number::parse("2.5"), Ok(float(2.5)));
        assert_eq!(Number::parse("1e3"), Ok(float(1000.0)));
        assert_eq!(Number::parse("-inf"), Ok(Number::MINUS_INFINITY));
        assert_eq!("7/3".parse::<Number>(), Ok(frac(7, 3)));
        assert!(Number::parse("12z").is_err());
    }

    #[test]
    fn test_literal() {
        let v = Number::from_literal("10", NumBase::Hexadecimal, '.', P);
        assert_eq!(v, Ok(int(16)));
        let v = Number::from_literal("A.8", NumBase::Hexadecimal, '.', P);
        assert_eq!(v, Ok(float(10.5)));
        let v = Number::from_literal("1.01", NumBase::Binary, '.', P);
        assert_eq!(v, Ok(float(1.25)));
        let v = Number::from_literal("2,5", NumBase::Decimal, ',', P);
        assert_eq!(v, Ok(float(2.5)));
        let v = Number::from_literal(".5", NumBase::Decimal, '.', P);
        assert_eq!(v, Ok(float(0.5)));
        assert!(Number::from_literal(".", NumBase::Decimal, '.', P).is_err());

        // the mantissa size follows the request
        match Number::from_literal("0.1", NumBase::Decimal, '.', 512) {
            Ok(Number::Float(f)) => assert_eq!(f.prec(), 512),
            v => panic!("unexpected {:?}", v),
        }
    }

    #[test]
    fn test_to_text() {
        assert_eq!(int(12345).to_text(5), "12345");
        assert_eq!(frac(23, 35).to_text(5), "23/35");
        assert_eq!(frac(4, 2).to_text(5), "2/1");
        assert_eq!(float(2.25).to_text(0), "2.25");
        assert_eq!(float(2.0).to_text(0), "2.0");
        assert_eq!(float(2.0).to_text(12), "2");
        assert_eq!(float(1200.0).to_text(12), "1200");
        assert_eq!(int(1).divide(float(3.0)).to_text(4), "0.3333");
        assert_eq!(float(123456.0).to_text(3), "1.23e+05");
        assert_eq!(float(0.00001234).to_text(3), "1.23e-05");
        assert_eq!(float(0.001234).to_text(3), "0.00123");
        assert_eq!(float(-1234.5).to_text(12), "-1234.5");
        assert_eq!(float(0.0).to_text(12), "0");
        assert_eq!(float(0.0).to_text(0), "0.0");
        assert_eq!(Number::UNDEFINED.to_text(12), "nan");
        assert_eq!(Number::INFINITY.to_text(12), "inf");
        assert_eq!(Number::MINUS_INFINITY.to_string(), "-inf");
    }

    #[test]
    fn test_to_text_long() {
        let v = int(2).sqrt(P);
        assert_eq!(v.to_text(30), "1.41421356237309504880168872421");
        let v = int(2).sqrt(256);
        assert_eq!(
            v.to_text(60),
            "1.41421356237309504880168872420969807856967187537694807317668"
        );
        // shortest form of a float read from text
        assert_eq!(Number::parse("0.1").unwrap().to_text(0), "0.1");
    }

    #[test]
    fn test_text_round_trip() {
        let values = [
            int(0),
            int(-17),
            Number::Integer(BigInt::from(7).pow(60)),
            frac(1, 3),
            frac(-22, 7),
            frac(9, 3),
            Number::Fraction(BigRational::new(BigInt::from(3).pow(50), BigInt::from(2).pow(70))),
            float(2.5),
            float(-0.375),
        ];
        for v in values.iter() {
            assert_eq!(&Number::parse(&v.to_text(64)).unwrap(), v);
        }
    }

    #[test]
    fn test_add() {
        assert_eq!(int(3).add(int(4)), int(7));
        assert_eq!(int(3).add(float(4.5)), float(7.5));
        assert_eq!(int(3).add(frac(4, 5)), frac(19, 5));
        assert_eq!(frac(1, 2).add(frac(1, 2)), frac(1, 1));
        assert_eq!(float(0.5).add(frac(1, 2)), float(1.0));
        assert_eq!(int(3).add(Number::INFINITY), Number::INFINITY);
        assert_eq!(Number::MINUS_INFINITY.add(int(3)), Number::MINUS_INFINITY);
        assert_eq!(Number::INFINITY.add(Number::MINUS_INFINITY), Number::UNDEFINED);
        assert_eq!(Number::INFINITY.add(Number::INFINITY), Number::INFINITY);
        assert_eq!(Number::UNDEFINED.add(int(1)), Number::UNDEFINED);
    }

    #[test]
    fn test_beyond_machine_range() {
        let huge = int(10).power(int(400), P);
        let v = huge.clone().add(float(0.5));
        assert!(matches!(v, Number::Float(..)));
        assert_eq!(v.to_text(5), "1e+400");
        assert_eq!(v.compare(&int(10).power(int(399), P)), Ordering::Greater);

        let big = int(2).power(int(2000), P);
        let v = big.clone().multiply(float(1.5)).divide(big);
        assert_eq!(v, float(1.5));

        let v = int(10).power(int(401), P).sqrt(P);
        assert!(matches!(v, Number::Float(..)));
        assert!(v.to_text(6).starts_with("3.16228e+200"));
        let v = int(10).power(int(400), P).ln(P);
        assert!(v.to_text(8).starts_with("921.03404"));

        let tiny = float(1.0).divide(int(10).power(int(400), P));
        assert_eq!(tiny.sign(), 1);
        assert_eq!(tiny.to_text(3), "1e-400");
    }

    #[test]
    fn test_mixed_precision() {
        let wide = Number::from_literal("1.5", NumBase::Decimal, '.', 512).unwrap();
        match wide.add(float(1.0)) {
            Number::Float(f) => assert_eq!(f.prec(), 512),
            v => panic!("unexpected {:?}", v),
        }
    }

    #[test]
    fn test_sub() {
        assert_eq!(int(3).subtract(int(4)), int(-1));
        assert_eq!(int(3).subtract(float(4.5)), float(-1.5));
        assert_eq!(int(3).subtract(frac(4, 5)), frac(11, 5));
        assert_eq!(int(3).subtract(Number::INFINITY), Number::MINUS_INFINITY);
        assert_eq!(Number::INFINITY.subtract(Number::INFINITY), Number::UNDEFINED);
    }

    #[test]
    fn test_mul() {
        assert_eq!(int(3).multiply(int(4)), int(12));
        assert_eq!(int(3).multiply(frac(1, 3)), frac(1, 1));
        assert_eq!(float(2.0).multiply(int(3)), float(6.0));
        assert_eq!(float(2.5).multiply(int(0)), float(0.0));
        assert_eq!(int(-2).multiply(Number::INFINITY), Number::MINUS_INFINITY);
        assert_eq!(Number::MINUS_INFINITY.multiply(Number::MINUS_INFINITY), Number::INFINITY);
        assert_eq!(int(0).multiply(Number::INFINITY), Number::UNDEFINED);
        assert_eq!(Number::UNDEFINED.multiply(Number::INFINITY), Number::UNDEFINED);
    }

    #[test]
    fn test_div() {
        assert_eq!(int(12).divide(int(4)), frac(3, 1));
        assert_eq!(int(6).divide(int(4)), frac(3, 2));
        assert_eq!(float(3.0).divide(int(2)), float(1.5));
        assert_eq!(int(3).divide(float(2.0)), float(1.5));
        assert_eq!(frac(1, 2).divide(frac(1, 4)), frac(2, 1));
        assert_eq!(int(1).divide(int(0)), Number::INFINITY);
        assert_eq!(int(-1).divide(int(0)), Number::MINUS_INFINITY);
        assert_eq!(int(0).divide(int(0)), Number::UNDEFINED);
        assert_eq!(float(1.0).divide(float(0.0)), Number::INFINITY);
        assert_eq!(int(5).divide(Number::INFINITY), int(0));
        assert_eq!(Number::INFINITY.divide(int(-2)), Number::MINUS_INFINITY);
        assert_eq!(Number::INFINITY.divide(Number::INFINITY), Number::UNDEFINED);
    }

    #[test]
    fn test_reciprocal() {
        assert_eq!(int(4).reciprocal(), frac(1, 4));
        assert_eq!(frac(-2, 3).reciprocal(), frac(-3, 2));
        assert_eq!(float(0.25).reciprocal(), float(4.0));
        assert_eq!(int(0).reciprocal(), Number::INFINITY);
        assert_eq!(Number::MINUS_INFINITY.reciprocal(), int(0));
        assert_eq!(Number::UNDEFINED.reciprocal(), Number::UNDEFINED);
    }

    #[test]
    fn test_div_int() {
        assert_eq!(int(12).integer_division(int(5)), int(2));
        assert_eq!(int(-12).integer_division(int(5)), int(-2));
        assert_eq!(frac(7, 2).integer_division(int(2)), int(1));
        assert_eq!(float(7.5).integer_division(int(2)), float(3.0));
        assert_eq!(int(1).integer_division(int(0)), Number::UNDEFINED);
    }

    #[test]
    fn test_modulo() {
        assert_eq!(int(7).modulo(int(3)), int(1));
        assert_eq!(int(-7).modulo(int(3)), int(2));
        assert_eq!(int(7).modulo(int(-3)), int(1));
        assert_eq!(frac(7, 2).modulo(int(2)), frac(3, 2));
        assert_eq!(float(7.5).modulo(int(2)), float(1.5));
        assert_eq!(float(-7.5).modulo(int(-2)), float(0.5));
        assert_eq!(int(7).modulo(int(0)), Number::UNDEFINED);
        assert_eq!(Number::INFINITY.modulo(int(3)), Number::UNDEFINED);
    }

    #[test]
    fn test_neg_abs_sign() {
        assert_eq!(int(12).negate(), int(-12));
        assert_eq!(frac(1, 2).negate(), frac(-1, 2));
        assert_eq!(float(1.5).negate(), float(-1.5));
        assert_eq!(Number::INFINITY.negate(), Number::MINUS_INFINITY);
        assert_eq!(Number::UNDEFINED.negate(), Number::UNDEFINED);
        assert_eq!(int(-3).abs(), int(3));
        assert_eq!(float(-2.5).abs(), float(2.5));
        assert_eq!(Number::MINUS_INFINITY.abs(), Number::INFINITY);
        assert_eq!(frac(-1, 2).sign(), -1);
        assert_eq!(float(-0.1).sign(), -1);
        assert_eq!(int(0).sign(), 0);
        assert_eq!(Number::UNDEFINED.sign(), 0);
    }

    #[test]
    fn test_compare() {
        assert_eq!(int(1).compare(&frac(1, 2)), Ordering::Greater);
        assert_eq!(frac(1, 2).compare(&float(0.5)), Ordering::Equal);
        assert_eq!(float(0.25).compare(&frac(1, 3)), Ordering::Less);
        assert_eq!(float(2.0).compare(&float(1.0)), Ordering::Greater);
        assert_eq!(int(2).compare(&frac(4, 2)), Ordering::Equal);
        assert_eq!(Number::INFINITY.compare(&int(1_000_000)), Ordering::Greater);
        assert_eq!(int(1).compare(&Number::MINUS_INFINITY), Ordering::Greater);
        assert_eq!(Number::INFINITY.compare(&Number::INFINITY), Ordering::Equal);
        assert_eq!(Number::UNDEFINED.compare(&Number::UNDEFINED), Ordering::Equal);
        assert_eq!(Number::UNDEFINED.compare(&Number::INFINITY), Ordering::Less);
        assert_eq!(Number::MINUS_INFINITY.compare(&Number::UNDEFINED), Ordering::Less);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(frac(7, 2).to_i64(), 3);
        assert_eq!(frac(-7, 2).to_i64(), -3);
        assert_eq!(float(9.99).to_i64(), 9);
        assert_eq!(float(-9.99).to_i64(), -9);
        assert_eq!(Number::INFINITY.to_i64(), 0);
        assert_eq!(frac(1, 4).to_f64(), 0.25);
        assert_eq!(float(0.75).to_f64(), 0.75);
        assert!(Number::UNDEFINED.to_f64().is_nan());
        assert!(frac(4, 2).is_integer());
        assert!(!float(0.5).is_integer());
        assert!(float(-3.0).is_integer());
        assert_eq!(Number::from(f64::NAN), Number::UNDEFINED);
        assert_eq!(Number::from(f64::NEG_INFINITY), Number::MINUS_INFINITY);
        assert_eq!(Number::fraction(BigInt::from(-3), BigInt::from(0)), Number::MINUS_INFINITY);

        let big = BigInt::from(-3).pow(101);
        assert_eq!(from_rug_integer(&to_rug_integer(&big)), big);
        assert_eq!(from_rug_integer(&to_rug_integer(&BigInt::zero())), BigInt::zero());
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(int(16).sqrt(P), int(4));
        assert!(close(&int(2).sqrt(P), 2.0f64.sqrt()));
        assert_eq!(frac(9, 4).sqrt(P), frac(3, 2));
        assert!(close(&frac(1, 2).sqrt(P), 0.5f64.sqrt()));
        assert_eq!(float(2.25).sqrt(P), float(1.5));
        assert_eq!(int(-4).sqrt(P), Number::UNDEFINED);
        assert_eq!(Number::INFINITY.sqrt(P), Number::INFINITY);
        assert_eq!(Number::MINUS_INFINITY.sqrt(P), Number::UNDEFINED);
    }

    #[test]
    fn test_cbrt() {
        assert_eq!(int(27).cbrt(P), int(3));
        assert_eq!(int(-8).cbrt(P), int(-2));
        assert_eq!(frac(8, 27).cbrt(P), frac(2, 3));
        assert!(close(&int(2).cbrt(P), 2.0f64.cbrt()));
        assert!(close(&int(-2).cbrt(P), -(2.0f64.cbrt())));
        assert_eq!(Number::MINUS_INFINITY.cbrt(P), Number::MINUS_INFINITY);
    }

    #[test]
    fn test_power() {
        assert_eq!(int(100).power(int(2), P), int(10000));
        assert_eq!(int(2).power(int(-2), P), frac(1, 4));
        assert_eq!(int(0).power(int(-1), P), Number::INFINITY);
        assert_eq!(int(0).power(int(0), P), int(1));
        assert_eq!(frac(2, 3).power(int(2), P), frac(4, 9));
        assert_eq!(frac(2, 3).power(int(-1), P), frac(3, 2));
        assert_eq!(int(8).power(frac(1, 3), P), int(2));
        assert_eq!(int(-8).power(frac(1, 3), P), int(-2));
        assert_eq!(int(-8).power(frac(2, 3), P), int(4));
        assert_eq!(int(8).power(frac(-1, 3), P), frac(1, 2));
        assert_eq!(frac(4, 9).power(frac(1, 2), P), frac(2, 3));
        assert_eq!(int(-4).power(frac(1, 2), P), Number::UNDEFINED);
        assert_eq!(float(-8.0).power(float(0.5), P), Number::UNDEFINED);
        assert_eq!(float(-8.0).power(float(0.25), P), Number::UNDEFINED);
        assert_eq!(float(-2.0).power(int(3), P), float(-8.0));

        // no overflow where a machine float would have one
        let v = float(1e300).power(int(2), P);
        assert_eq!(v.to_text(3), "1e+600");

        assert!(close(&int(2).power(frac(1, 2), P), 2.0f64.sqrt()));
        assert!(close(&int(2).power(float(0.5), P), 2.0f64.sqrt()));
        let fifth = Number::parse("0.2").unwrap();
        assert!(close(&float(-32.0).power(fifth, P), -2.0));
        assert!(close(&int(-4).power(frac(1, 3), P), -(4.0f64.cbrt())));
    }

    #[test]
    fn test_power_result_size() {
        // within the exponent limit but far too long to build exactly
        let base = int(10).power(int(100_000), P);
        assert!(matches!(base, Number::Integer(..)));
        let v = base.power(int(1_000_000), P);
        assert!(matches!(v, Number::Float(..) | Number::Special(Special::Infinity)), "{:?}", v);

        let v = frac(1, 1000).power(int(1_000_000), P);
        assert!(matches!(v, Number::Float(..)));
        assert_eq!(v.sign(), 1);

        let v = int(2).power(int(1_000_000), P);
        assert!(matches!(v, Number::Integer(..)));
        let v = int(31).power(int(1_000_000), P);
        assert!(matches!(v, Number::Float(..)));
    }

    #[test]
    fn test_power_special() {
        assert_eq!(Number::UNDEFINED.power(int(0), P), Number::UNDEFINED);
        assert_eq!(int(2).power(Number::UNDEFINED, P), Number::UNDEFINED);
        assert_eq!(Number::INFINITY.power(int(2), P), Number::INFINITY);
        assert_eq!(Number::INFINITY.power(int(-2), P), int(0));
        assert_eq!(Number::INFINITY.power(int(0), P), int(1));
        assert_eq!(Number::MINUS_INFINITY.power(int(3), P), Number::MINUS_INFINITY);
        assert_eq!(Number::MINUS_INFINITY.power(float(3.0), P), Number::MINUS_INFINITY);
        assert_eq!(Number::MINUS_INFINITY.power(int(2), P), Number::INFINITY);
        assert_eq!(Number::MINUS_INFINITY.power(frac(1, 2), P), Number::UNDEFINED);
        assert_eq!(int(2).power(Number::INFINITY, P), Number::INFINITY);
        assert_eq!(frac(1, 2).power(Number::INFINITY, P), float(0.0));
    }

    #[test]
    fn test_factorial() {
        assert_eq!(int(0).factorial(), int(1));
        assert_eq!(int(5).factorial(), int(120));
        assert_eq!(frac(6, 2).factorial(), int(6));
        assert_eq!(float(4.0).factorial(), int(24));
        assert_eq!(int(-1).factorial(), Number::UNDEFINED);
        assert_eq!(frac(1, 2).factorial(), Number::UNDEFINED);
        assert_eq!(float(2.5).factorial(), Number::UNDEFINED);
        assert_eq!(int(MAX_FACTORIAL as i64 + 1).factorial(), Number::UNDEFINED);
        assert_eq!(Number::INFINITY.factorial(), Number::INFINITY);
        assert_eq!(Number::MINUS_INFINITY.factorial(), Number::UNDEFINED);
        let big = int(30).factorial();
        assert_eq!(big.to_text(0), "265252859812191058636308480000000");
    }

    #[test]
    fn test_trig() {
        let deg = AngleMode::Degree;
        assert_eq!(int(0).sin(deg, P), int(0));
        assert_eq!(int(90).sin(deg, P), int(1));
        assert_eq!(int(-90).sin(deg, P), int(-1));
        assert_eq!(int(450).sin(deg, P), int(1));
        assert_eq!(int(90).cos(deg, P), int(0));
        assert_eq!(int(180).cos(deg, P), int(-1));
        assert_eq!(int(90).tan(deg, P), Number::UNDEFINED);
        assert_eq!(int(180).tan(deg, P), int(0));
        assert_eq!(int(100).sin(AngleMode::Gradient, P), int(1));
        assert_eq!(int(0).cos(AngleMode::Radian, P), float(1.0));

        assert!(close(&int(30).sin(deg, P), 0.5));
        assert!(close(&int(45).tan(deg, P), 1.0));
        let pi = Number::Float(Float::with_val(P, Constant::Pi));
        assert_eq!(pi.sin(AngleMode::Radian, P), float(0.0));
        assert_eq!(Number::INFINITY.sin(AngleMode::Radian, P), Number::UNDEFINED);
    }

    #[test]
    fn test_trig_whole_float() {
        let deg = AngleMode::Degree;
        assert_eq!(float(90.0).tan(deg, P), Number::UNDEFINED);
        assert_eq!(float(-270.0).tan(deg, P), Number::UNDEFINED);
        assert_eq!(float(90.0).sin(deg, P), float(1.0));
        assert_eq!(float(180.0).cos(deg, P), float(-1.0));
        assert_eq!(float(180.0).tan(deg, P), float(0.0));
        assert_eq!(float(300.0).sin(AngleMode::Gradient, P), float(-1.0));
        assert!(close(&float(90.5).tan(deg, P), -114.58865012930961));
    }

    #[test]
    fn test_logarithms() {
        assert_eq!(int(1000).log10(P), int(3));
        assert_eq!(int(1).log10(P), int(0));
        assert_eq!(frac(1, 100).log10(P), int(-2));
        assert!(close(&int(2).log10(P), 2.0f64.log10()));
        assert_eq!(int(0).log10(P), Number::MINUS_INFINITY);
        assert_eq!(int(-10).log10(P), Number::UNDEFINED);
        assert_eq!(Number::INFINITY.log10(P), Number::INFINITY);
        assert_eq!(int(1).ln(P), float(0.0));
        let e = Number::Float(Float::with_val(P, 1).exp());
        assert!(close(&e.ln(P), 1.0));
        assert_eq!(int(0).ln(P), Number::MINUS_INFINITY);
        assert_eq!(frac(-1, 2).ln(P), Number::UNDEFINED);
    }
}
