use std::fmt;
use std::str::FromStr;

/// Mantissa bits of a float created from exact operands when the configured
/// precision asks for fewer
pub const MIN_FLOAT_BITS: u32 = 128;

// extra bits that absorb the rounding of intermediate results
const GUARD_BITS: u32 = 32;

/// Radix used both to recognise digits while tokenizing and to read number
/// literals while evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumBase {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl NumBase {
    pub fn radix(self) -> u32 {
        match self {
            NumBase::Binary => 2,
            NumBase::Octal => 8,
            NumBase::Decimal => 10,
            NumBase::Hexadecimal => 16,
        }
    }

    /// Returns true if `c` is a digit in this base. Letters are accepted in
    /// either case.
    pub fn is_digit(self, c: char) -> bool {
        c.is_digit(self.radix())
    }
}

impl Default for NumBase {
    fn default() -> NumBase {
        NumBase::Decimal
    }
}

impl fmt::Display for NumBase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            NumBase::Binary => "bin",
            NumBase::Octal => "oct",
            NumBase::Decimal => "dec",
            NumBase::Hexadecimal => "hex",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for NumBase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bin" | "binary" | "2" => Ok(NumBase::Binary),
            "oct" | "octal" | "8" => Ok(NumBase::Octal),
            "dec" | "decimal" | "10" => Ok(NumBase::Decimal),
            "hex" | "hexadecimal" | "16" => Ok(NumBase::Hexadecimal),
            _ => Err(format!("unknown number base '{}'", s)),
        }
    }
}

/// Unit of the arguments of the trigonometric functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleMode {
    Degree,
    Radian,
    Gradient,
}

impl AngleMode {
    /// Size of a full turn in this unit, `None` for radians where a full
    /// turn is not a rational number.
    pub(crate) fn full_turn(self) -> Option<i64> {
        match self {
            AngleMode::Degree => Some(360),
            AngleMode::Gradient => Some(400),
            AngleMode::Radian => None,
        }
    }
}

impl Default for AngleMode {
    fn default() -> AngleMode {
        AngleMode::Degree
    }
}

impl FromStr for AngleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deg" | "degree" => Ok(AngleMode::Degree),
            "rad" | "radian" => Ok(AngleMode::Radian),
            "grad" | "gradient" => Ok(AngleMode::Gradient),
            _ => Err(format!("unknown angle mode '{}'", s)),
        }
    }
}

/// Everything an evaluation depends on besides the expression itself
#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    pub base: NumBase,
    pub angle_mode: AngleMode,
    /// Radix point accepted inside number literals
    pub decimal_point: char,
    /// Significant digits of float results. Floats are computed with at
    /// least this many digits and printed with exactly this many
    pub precision: i32,
}

impl Default for EvalConfig {
    fn default() -> EvalConfig {
        EvalConfig {
            base: NumBase::Decimal,
            angle_mode: AngleMode::Degree,
            decimal_point: '.',
            precision: 12,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_base(mut self, base: NumBase) -> Self {
        self.base = base;
        self
    }

    pub fn with_angle_mode(mut self, angle_mode: AngleMode) -> Self {
        self.angle_mode = angle_mode;
        self
    }

    pub fn with_decimal_point(mut self, decimal_point: char) -> Self {
        self.decimal_point = decimal_point;
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    /// Mantissa bits of the floats an evaluation creates
    pub fn float_bits(&self) -> u32 {
        let digits = self.precision.max(0) as f64;
        let bits = (digits * std::f64::consts::LOG2_10).ceil() as u32 + GUARD_BITS;
        bits.max(MIN_FLOAT_BITS)
    }
}
