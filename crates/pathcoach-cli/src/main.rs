mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, key::KeySubcommand, plan::PlanSubcommand,
    profile::ProfileSubcommand, quiz::QuizSubcommand, song::SongSubcommand,
    state::StateSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pathcoach",
    about = "Personal coaching from the terminal: describe where you are and where you want to be, get an action plan and a motivational song",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data directory (default: ~/.pathcoach)
    #[arg(long, global = true, env = "PATHCOACH_HOME")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and a default config
    Init,

    /// Manage your name, age and gender
    Profile {
        #[command(subcommand)]
        subcommand: ProfileSubcommand,
    },

    /// Describe your current and desired state
    State {
        #[command(subcommand)]
        subcommand: StateSubcommand,
    },

    /// Mental-health self-check that fills in both states
    Quiz {
        #[command(subcommand)]
        subcommand: QuizSubcommand,
    },

    /// Manage API keys for the text and music services
    Key {
        #[command(subcommand)]
        subcommand: KeySubcommand,
    },

    /// Generate or show your action plan
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },

    /// Generate lyrics and audio for your motivational song
    Song {
        #[command(subcommand)]
        subcommand: SongSubcommand,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Clear the stored session
    Reset {
        /// Keep stored API keys
        #[arg(long)]
        keep_keys: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Song { .. } | Commands::Plan { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = root::resolve_root(cli.root.as_deref()).and_then(|root| match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Profile { subcommand } => cmd::profile::run(&root, subcommand, cli.json),
        Commands::State { subcommand } => cmd::state::run(&root, subcommand, cli.json),
        Commands::Quiz { subcommand } => cmd::quiz::run(&root, subcommand, cli.json),
        Commands::Key { subcommand } => cmd::key::run(&root, subcommand, cli.json),
        Commands::Plan { subcommand } => cmd::plan::run(&root, subcommand, cli.json),
        Commands::Song { subcommand } => cmd::song::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Reset { keep_keys } => cmd::reset::run(&root, keep_keys, cli.json),
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
