use clap::Parser;
use dice_equations::roll::{Dice, RandomBuffer, RandomOrgSource};
use dice_equations::{eval, Calculator, Config, Context};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Reads dice equations one per line and prints each result with its rolls.
#[derive(Parser, Debug)]
#[command(name = "repl", version)]
struct Cli {
    /// Use the shunting-yard calculator instead of the expression tree.
    #[arg(long)]
    calc: bool,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    let ctx = Context::new().with_limits(config.limits);
    let calculator = Calculator::new().with_limits(config.limits);
    let buffer =
        RandomBuffer::new(config.random.clone()).with_source(Arc::new(RandomOrgSource::new()));
    let mut dice = Dice::new(buffer.clone()).with_max_rolls(Some(config.limits.max_rolls));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("> ");
    io::stdout().flush()?;
    while let Some(Ok(line)) = lines.next() {
        if buffer.low() {
            buffer.load_random_buffer();
        }
        let line = line.trim();
        if !line.is_empty() {
            let (result, log) = dice.logged(|dice| {
                if cli.calc {
                    calculator.calculate(line, dice).map(|n| n.to_string())
                } else {
                    eval::evaluate_str(line, &ctx, dice).map(|n| n.to_string())
                }
            });
            match result {
                Ok(value) if log.is_empty() => println!("{}", value),
                Ok(value) => println!("{}\n{}", value, log),
                Err(why) => eprintln!("Error: {}", why),
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
