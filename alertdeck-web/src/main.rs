use alertdeck_web::WebConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = WebConfig::load()?;
    alertdeck_web::start_server(config.port).await
}
