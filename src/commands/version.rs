use anyhow::Result;

pub async fn handle_version() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");

    println!("{} v{}", NAME, VERSION);
    println!("Capture screenshots and page info from a running Chrome via CDP");
    Ok(())
}
