#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chatkey::app::run().await
}
