use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use infer_classpath::ClasspathInference;
use infer_config::{init_tracing, ClasspathConfig};
use std::{collections::BTreeSet, path::PathBuf};

#[derive(Parser)]
#[command(name = "infer", version, about = "Infer the classpath of a Java workspace")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the jars needed to compile the workspace
    Classpath(ResolveArgs),
    /// Print the source jars of the workspace's dependencies
    Docpath(ResolveArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Workspace root (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Config file (defaults to `<path>/.infer.toml` when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print a JSON array instead of one path per line
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let (args, sources) = match cli.command {
        Command::Classpath(args) => (args, false),
        Command::Docpath(args) => (args, true),
    };

    let root = std::path::absolute(&args.path)
        .with_context(|| format!("invalid workspace path {}", args.path.display()))?;
    let config = match &args.config {
        Some(path) => ClasspathConfig::load(path)?,
        None => ClasspathConfig::discover(&root)?,
    };
    init_tracing(&config.logging);
    tracing::debug!(target: "infer.cli", root = %root.display(), sources, "resolving");

    let inference = ClasspathInference::new(root, &config);
    let paths = if sources {
        inference.build_doc_path()
    } else {
        inference.class_path()
    };
    print_paths(&paths, args.json)?;
    Ok(0)
}

fn print_paths(paths: &BTreeSet<PathBuf>, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(paths)?;
        println!("{out}");
    } else {
        for path in paths {
            println!("{}", path.display());
        }
    }
    Ok(())
}
