use clap::{Parser, Subcommand};

mod app;
mod audio;
mod commands;
mod logging;
mod ui;

#[derive(Parser)]
#[command(name = "countdown", version, about = "Countdown timer with an alarm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive countdown in the terminal
    Run(commands::run::RunArgs),
    /// Run a countdown on a virtual clock and print its events as JSON
    Simulate(commands::simulate::SimulateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Simulate(args) => {
            logging::init_stderr();
            commands::simulate::run(args)
        }
        Commands::Config { action } => {
            logging::init_stderr();
            commands::config::run(action)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
