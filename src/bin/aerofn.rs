use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "aerofn", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a function definition and print its value per simulation step.
    Eval(EvalArgs),
    /// Build a function definition and report construction errors, if any.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// Input function definition JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Seed a property before building, as path=value (repeatable).
    #[arg(long = "set", value_name = "PATH=VALUE")]
    set: Vec<String>,

    /// Prefix for the publication path of a named function.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Number of simulation steps to evaluate.
    #[arg(long, default_value_t = 1)]
    steps: u64,

    /// Seed for the random operations.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input function definition JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Seed a property before building, as path=value (repeatable).
    #[arg(long = "set", value_name = "PATH=VALUE")]
    set: Vec<String>,

    /// Prefix for the publication path of a named function.
    #[arg(long, default_value = "")]
    prefix: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Eval(args) => cmd_eval(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn read_definition(path: &Path) -> anyhow::Result<aerofn::ConfigNode> {
    let f = File::open(path).with_context(|| format!("open definition '{}'", path.display()))?;
    let r = BufReader::new(f);
    let node: aerofn::ConfigNode =
        serde_json::from_reader(r).with_context(|| "parse definition JSON")?;
    Ok(node)
}

fn seeded_context(seed: u64, sets: &[String]) -> anyhow::Result<Rc<aerofn::SimContext>> {
    let ctx = Rc::new(aerofn::SimContext::with_seed(seed));
    for entry in sets {
        let (path, value) = entry
            .split_once('=')
            .with_context(|| format!("--set '{entry}' is not of the form path=value"))?;
        let value: f64 = value
            .parse()
            .with_context(|| format!("--set '{entry}' has a non-numeric value"))?;
        ctx.properties().set(path, value)?;
    }
    Ok(ctx)
}

fn cmd_eval(args: EvalArgs) -> anyhow::Result<()> {
    let node = read_definition(&args.in_path)?;
    let ctx = seeded_context(args.seed, &args.set)?;
    let function = aerofn::Function::from_config(&ctx, &node, &args.prefix)
        .with_context(|| "build function")?;

    for step in 0..args.steps {
        ctx.advance_cycle();
        println!("step {step}: {}", function.value_as_string());
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let node = read_definition(&args.in_path)?;
    let ctx = seeded_context(0, &args.set)?;
    let function = aerofn::Function::from_config(&ctx, &node, &args.prefix)
        .with_context(|| "build function")?;

    match function.name() {
        Some(name) => println!("ok: publishes '{name}'"),
        None => println!("ok: anonymous function"),
    }
    Ok(())
}
