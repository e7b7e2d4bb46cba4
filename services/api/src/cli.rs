use crate::commands::{run_grade, run_predict, run_rank, GradeArgs, PredictArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dispatch_scoring::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Dispatch Scoring",
    about = "Score field-service dispatches, rank technicians, and grade completed work",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a CSV of dispatches with their model estimates
    Predict(PredictArgs),
    /// Suggest the best technicians for each open dispatch
    Rank(RankArgs),
    /// Grade completed dispatches from a history export
    Grade(GradeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) blend: BlendOverrides,
    /// Technicians kept per dispatch when ranking
    #[arg(long)]
    pub(crate) top_n: Option<usize>,
}

/// Flags for commands that blend rule and model probabilities.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct BlendOverrides {
    /// Share of the final probability given to the rule estimate, in [0, 1]
    #[arg(long)]
    pub(crate) rule_weight: Option<f64>,
    /// Use the model probability alone instead of blending
    #[arg(long)]
    pub(crate) model_only: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Rank(args) => run_rank(args),
        Command::Grade(args) => run_grade(args),
    }
}
