#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jewelrybox_server::start().await
}
