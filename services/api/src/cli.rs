use crate::commands::{run_export, run_submit, ExportArgs, SubmitArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use club_waitlist::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Club Waitlist",
    about = "Serve and administer the club waitlist signup pipeline",
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
    /// Submit one waitlist entry through the configured store
    Submit(SubmitArgs),
    /// Print the audit log of every accepted submission
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Submit(args) => run_submit(args).await,
        Command::Export(args) => run_export(args).await,
    }
}
