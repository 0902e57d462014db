use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cobot_cli::main_entry().await
}
