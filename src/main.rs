//! Command-line interface for kcalc-parser
//!
//! Evaluates every expression given on the command line, or every line of
//! the standard input when no expression is given, and prints the result
//! followed by one line per diagnostic.

use clap::Parser as ClapParser;
use kcalc_parser::{AngleMode, EvalConfig, NumBase, Parser};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number base of the literals: bin, oct, dec, or hex
    #[arg(short, long, default_value = "dec")]
    base: NumBase,

    /// Unit of trigonometric function arguments: deg, rad, or grad
    #[arg(short, long, default_value = "deg")]
    angle: AngleMode,

    /// Significant digits of float results, 0 prints every reliable digit
    #[arg(short, long, default_value_t = 12)]
    precision: i32,

    /// Expressions to evaluate
    expressions: Vec<String>,
}

fn evaluate(parser: &Parser, expression: &str, out: &mut impl Write) -> io::Result<bool> {
    let ev = parser.parse_expression(expression);
    writeln!(out, "{}", ev.result.to_text(parser.config().precision))?;
    for d in ev.diagnostics.iter() {
        writeln!(out, "  {}", d)?;
    }
    Ok(ev.is_clean())
}

fn run(args: Args) -> io::Result<bool> {
    let cfg = EvalConfig::new()
        .with_base(args.base)
        .with_angle_mode(args.angle)
        .with_precision(args.precision);
    let parser = Parser::with_config(cfg);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut clean = true;

    if !args.expressions.is_empty() {
        for expr in args.expressions.iter() {
            clean &= evaluate(&parser, expr, &mut out)?;
        }
        return Ok(clean);
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        clean &= evaluate(&parser, &line, &mut out)?;
    }
    Ok(clean)
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("kcalc-eval: {}", e);
            ExitCode::FAILURE
        }
    }
}
