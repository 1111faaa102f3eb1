use propertydata_http::{LocationQuery, PropertyDataClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = PropertyDataClient::from_env()?;

    if !client.test_connection().await {
        anyhow::bail!("PropertyData API rejected the configured key");
    }

    let credits = client.account_credits().await?;
    println!("credits: {}", serde_json::to_string_pretty(credits.as_json())?);

    let params = LocationQuery::postcode("W14 9JH").into_params()?;
    let demand = client.get("demand", params).await?;
    println!("demand: {demand:?}");

    Ok(())
}
