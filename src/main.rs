use std::fs;
use std::path::PathBuf;

use arith::Parser as ExprParser;
use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::WrapErr;
use tracing::Level;

const DEMO_EXPRESSION: &str = "-4.123+5*-6/3-2.*-(2-1)";

#[derive(Parser, Debug)]
#[command(version, about = "Parse, evaluate and print arithmetic expressions")]
struct Args {
    /// Increase log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the value of an expression
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Print the fully parenthesized form of an expression
    Render {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Evaluate every non-blank line of a file
    Batch { filename: PathBuf },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        None => {
            let tree = parse_or_exit(None, DEMO_EXPRESSION);
            println!("Result: {}", arith::evaluate(&tree));
            println!("{tree}");
        }
        Some(Commands::Eval { expression }) => {
            let tree = parse_or_exit(None, &expression);
            println!("{}", arith::evaluate(&tree));
        }
        Some(Commands::Render { expression }) => {
            let tree = parse_or_exit(None, &expression);
            println!("{}", arith::render(&tree));
        }
        Some(Commands::Batch { filename }) => {
            let file_contents = fs::read_to_string(&filename)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;

            for (number, line) in file_contents.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let name = format!("{}:{}", filename.display(), number + 1);
                let tree = parse_or_exit(Some(name.as_str()), line);
                tracing::info!(line = number + 1, "evaluated");
                println!("{tree} = {}", tree.evaluate());
            }
        }
    }
    Ok(())
}

/// Parses `source`, or reports the syntax error and exits with status 65.
fn parse_or_exit(filename: Option<&str>, source: &str) -> arith::Node {
    match ExprParser::new(filename, source).parse_expression() {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(65);
        }
    }
}
