use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let database = DatabaseManager::connect(&crate::config::config().database).await?;
    let result = database.migrate().await;
    database.close().await;
    result?;

    output_success(&output_format, "Migrations applied", None)
}
