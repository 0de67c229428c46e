use log::debug;

use crate::config::{AngleMode, EvalConfig, NumBase};
use crate::errors::*;
use crate::registry::{Evaluator, Registry, DEFAULT_MODE};
use crate::stack::{arrange, calculate, Arrangement, Evaluation};
use crate::token::{tokenize, Token, Tokens};

/// Holds the known operators and functions and the evaluation settings.
///
/// Parsing never changes the parser: every call works on its own scratch
/// stacks, so one parser can be shared between threads and evaluating the
/// same text twice gives the same result.
#[derive(Debug, Clone)]
pub struct Parser {
    registry: Registry,
    config: EvalConfig,
}

impl Default for Parser {
    fn default() -> Parser {
        Parser {
            registry: Registry::with_defaults(),
            config: EvalConfig::default(),
        }
    }
}

impl Parser {
    /// Parser with the standard operators and functions and default settings
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Parser {
            registry: Registry::with_defaults(),
            config,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EvalConfig) {
        self.config = config;
    }

    pub fn set_base(&mut self, base: NumBase) {
        self.config.base = base;
    }

    pub fn set_angle_mode(&mut self, angle_mode: AngleMode) {
        self.config.angle_mode = angle_mode;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Adds an operator or a function to the standard mode
    pub fn register(&mut self, evaluator: Evaluator) -> Result<(), CalcError> {
        self.registry.register(DEFAULT_MODE, evaluator)
    }

    /// Splits the expression into tokens using the names of the active
    /// modes and the current number base
    pub fn tokenize(&self, expression: &str) -> Tokens {
        tokenize(
            expression,
            self.registry.words(),
            self.config.base,
            self.config.decimal_point,
        )
    }

    /// Rearranges tokens into postfix order
    pub fn parse_tokens<I>(&self, tokens: I) -> Arrangement<'_>
    where
        I: IntoIterator<Item = Token>,
    {
        arrange(&self.registry, tokens)
    }

    /// Reduces arranged nodes to one value. The result carries the
    /// diagnostics of the arrangement followed by its own
    pub fn evaluate_tokens(&self, arrangement: &Arrangement) -> Evaluation {
        calculate(&arrangement.nodes, &self.config, arrangement.diagnostics.clone())
    }

    /// Tokenizes, arranges and evaluates an expression
    pub fn parse_expression(&self, expression: &str) -> Evaluation {
        let arrangement = self.parse_tokens(self.tokenize(expression));
        let ev = self.evaluate_tokens(&arrangement);
        debug!(
            "'{}' = {} ({} diagnostics)",
            expression,
            ev.result.to_text(self.config.precision),
            ev.diagnostics.len()
        );
        ev
    }
}

/// Evaluates an expression with the standard operators and default settings
///
/// # Example
///
/// ```
/// use kcalc_parser::parse::eval;
/// use kcalc_parser::number::Number;
///
/// let ev = eval("2 + 3 * 4");
/// assert_eq!(ev.result, Number::from(14));
/// assert!(ev.diagnostics.is_empty());
/// ```
pub fn eval(expression: &str) -> Evaluation {
    Parser::new().parse_expression(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Number;
    use crate::registry::Fixity;
    use crate::token::TokenKind;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn double(args: &[Number], _cfg: &EvalConfig) -> Number {
        match args {
            [v] => v.clone().multiply(Number::from(2)),
            _ => Number::UNDEFINED,
        }
    }

    #[test]
    fn test_eval() {
        init();
        assert_eq!(eval("1 + 2").result, Number::from(3));
        assert_eq!(eval("2 * 2.5").result, Number::from(5.0));
        assert_eq!(eval("1/3 + 1/6").result.to_text(0), "1/2");
        assert_eq!(eval("12 MOD 5").result, Number::from(2));
        assert_eq!(eval("sqrt(2)^2").result.to_text(10), "2");
    }

    #[test]
    fn test_stages() {
        init();
        let p = Parser::new();
        let tokens: Vec<Token> = p.tokenize("sin(90) + 1").collect();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[0], Token::new(TokenKind::FunctionName, "sin", 0));

        let arr = p.parse_tokens(tokens);
        assert_eq!(arr.nodes.len(), 4);
        assert!(arr.diagnostics.is_empty());

        let ev = p.evaluate_tokens(&arr);
        assert_eq!(ev.result, Number::from(2));
        assert_eq!(p.evaluate_tokens(&arr), ev);
    }

    #[test]
    fn test_base() {
        init();
        let mut p = Parser::new();
        p.set_base(NumBase::Hexadecimal);
        assert_eq!(p.parse_expression("ff + 1").result, Number::from(256));
        assert_eq!(p.parse_expression("10cos(0)").diagnostics.len(), 1);
        p.set_base(NumBase::Binary);
        assert_eq!(p.parse_expression("101 * 11").result, Number::from(15));
        p.set_base(NumBase::Octal);
        assert_eq!(p.parse_expression("17 + 1").result, Number::from(16));
    }

    #[test]
    fn test_angle_mode() {
        init();
        let mut p = Parser::new();
        assert_eq!(p.parse_expression("sin 90").result, Number::from(1));
        p.set_angle_mode(AngleMode::Gradient);
        assert_eq!(p.parse_expression("sin 100").result, Number::from(1));
        p.set_angle_mode(AngleMode::Radian);
        let v = p.parse_expression("cos 3.141592653589793").result.to_f64();
        assert!((v + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decimal_point() {
        init();
        let p = Parser::with_config(EvalConfig::new().with_decimal_point(','));
        assert_eq!(p.parse_expression("2,5 * 2").result, Number::from(5.0));
        assert_eq!(p.config().decimal_point, ',');
    }

    #[test]
    fn test_register() {
        init();
        let mut p = Parser::new();
        p.register(Evaluator::function("double", double)).unwrap();
        assert_eq!(p.parse_expression("double(4) + 1").result, Number::from(9));
        assert!(p.register(Evaluator::function("Double", double)).is_err());

        // pending functions are applied before a postfix operator
        p.register(Evaluator::postfix("half", |args, _| match args {
            [v] => v.clone().divide(Number::from(2)),
            _ => Number::UNDEFINED,
        }))
        .unwrap();
        assert_eq!(p.parse_expression("double 3 half").result.to_text(0), "3/1");
    }

    #[test]
    fn test_modes() {
        init();
        let mut p = Parser::new();
        let reg = p.registry_mut();
        reg.add_mode("extra");
        reg.register("extra", Evaluator::function("twice", double)).unwrap();

        // unknown name: every letter is an invalid token
        let ev = p.parse_expression("twice 4");
        assert_eq!(ev.diagnostics.len(), 5);
        assert_eq!(ev.result, Number::from(4));

        p.registry_mut().activate_mode("extra").unwrap();
        assert_eq!(p.parse_expression("twice 4").result, Number::from(8));

        p.registry_mut().set_active_mode("extra").unwrap();
        let ev = p.parse_expression("twice 4");
        assert_eq!(ev.result, Number::from(8));
        assert!(p.registry().lookup(&Token::new(TokenKind::Operator, "+", 0), &[Fixity::Infix]).is_none());
    }

    #[test]
    fn test_shared() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();

        init();
        let p = std::sync::Arc::new(Parser::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let p = p.clone();
                std::thread::spawn(move || p.parse_expression(&format!("{} * 10", i)).result)
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), Number::from(i as i64 * 10));
        }
    }
}
