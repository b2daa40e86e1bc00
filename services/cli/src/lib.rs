mod cli;
mod commands;
mod infra;

use sales_analytics::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
