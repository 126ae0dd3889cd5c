#[tokio::main]
async fn main() -> anyhow::Result<()> {
    barbearia_server::run().await
}
