use aud365::{cmd, error};
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser, Debug)]
#[command(
    name = "aud365",
    about = "Audit and compliance reports for Microsoft 365 tenants",
    version,
    long_about = "Generate searchable HTML and CSV compliance reports from Microsoft 365 data\n\n\
                  Feed it Graph/Exchange query results and a declarative report definition;\n\
                  it handles normalization, summary metrics, and rendering."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an HTML + CSV report from records and a definition
    Generate(cmd::generate::GenerateArgs),

    /// Write a sample report definition to edit
    Init(cmd::definition::InitArgs),

    /// Manage pipeline settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current settings
    Show,

    /// Update settings
    Set(cmd::config::SetArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> error::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("aud365=debug")
            .init();
    }

    match cli.command {
        Commands::Generate(args) => cmd::generate::generate(args)?,
        Commands::Init(args) => cmd::definition::init(args)?,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => cmd::config::show()?,
            ConfigCommands::Set(args) => cmd::config::set(args)?,
        },
    }

    Ok(())
}
