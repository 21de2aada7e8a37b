#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = prestasi::run().await {
        eprintln!("prestasi: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
