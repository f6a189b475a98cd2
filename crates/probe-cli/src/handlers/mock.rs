use probe_client::mock;

pub async fn handle(host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    println!("Mock kanban API listening on http://{addr}/api (Ctrl-C to stop)");
    mock::serve(&addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
        }
    })
    .await?;
    Ok(())
}
