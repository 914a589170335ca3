use anyhow::Result;
use routeway::Client;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let client = Client::from_env()?;

    let models = client.models().await?;

    for model in &models.data {
        println!(
            "{:<32} {:<12} starter={} pro={} enterprise={}",
            model.id, model.owned_by, model.access.starter, model.access.pro, model.access.enterprise
        );
    }

    Ok(())
}
