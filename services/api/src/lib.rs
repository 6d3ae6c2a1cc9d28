mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use club_waitlist::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
