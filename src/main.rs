use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    // `danawarga hash-password <password>` prints a PHC string for users.json
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("hash-password") {
        let Some(pw) = args.get(2) else {
            anyhow::bail!("usage: danawarga hash-password <password>");
        };
        println!("{}", danawarga::security::hash_password(pw)?);
        return Ok(());
    }

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "danawarga", "danawarga starting: RUST_LOG='{}'", rust_log);

    danawarga::server::run().await
}
