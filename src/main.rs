use nanogen::{
    logger::{self, LoggerConfig},
    ClientConfig, GenerationClient, GenerationParams, ImagePayload, ImageSize, PollConfig,
    TaskPoller,
};
use std::env;

const USAGE: &str = "Usage:
  nanogen <image-path> <prompt> [size]   upload, generate and wait for the result
  nanogen serve                          run the passthrough API (feature \"server\")";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("serve") => serve().await,
        Some("-h") | Some("--help") | None => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(_) if args.len() >= 2 => generate(&args).await,
        Some(_) => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

async fn generate(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let image_path = &args[0];
    let prompt = &args[1];
    let size: ImageSize = match args.get(2) {
        Some(size) => size.parse()?,
        None => ImageSize::default(),
    };

    let client_config = ClientConfig::from_env();
    let poll_config = PollConfig::from_env();
    logger::log_config_info(&client_config, &poll_config);

    let client = GenerationClient::new(client_config)?;
    let _timer = logger::timer("Generation");

    let image = ImagePayload::from_path(image_path).await?;
    let uploaded = match client.submit_image(image).await {
        Ok(uploaded) => uploaded,
        Err(e) => {
            log::error!("❌ Upload failed: {}", e);
            return Err(e.into());
        }
    };

    let params = GenerationParams::new().with_size(size);
    let handle = client.start_generation(&uploaded, prompt, params).await?;
    log::info!("🎨 Task {} submitted, waiting for result...", handle.task_id);

    let poller = TaskPoller::new(client, poll_config);
    let status = poller.wait_for_completion(&handle).await?;

    println!("{}", serde_json::to_string_pretty(status.as_json())?);
    Ok(())
}

#[cfg(feature = "server")]
async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    nanogen::server::run(nanogen::ServerConfig::from_env()).await?;
    Ok(())
}

#[cfg(not(feature = "server"))]
async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    log::error!("❌ Built without the \"server\" feature");
    Err("server feature not enabled".into())
}
