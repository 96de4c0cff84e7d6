#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ledger_mirror::cli::run_cli().await
}
