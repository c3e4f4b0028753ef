use imagegen_gateway::{logger, RequestDispatcher};
use serde_json::Value;
use std::env;
use std::fs;
use std::io::{self, Read};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init()?;
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    log::info!("🔄 Creating Bedrock client...");
    let dispatcher = match RequestDispatcher::from_env().await {
        Ok(dispatcher) => {
            log::info!("✅ Bedrock client initialized successfully");
            dispatcher
        }
        Err(e) => {
            log::error!("❌ Failed to initialize Bedrock client: {}", e);
            return Err(e.into());
        }
    };

    let arg = env::args().nth(1);

    #[cfg(feature = "server")]
    let dispatcher = match serve(dispatcher, arg.as_deref()).await? {
        Some(dispatcher) => dispatcher,
        None => return Ok(()),
    };

    let raw = match arg.as_deref() {
        Some(path) if path != "-" => fs::read_to_string(path)?,
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let event: Value = serde_json::from_str(&raw)?;

    let response = dispatcher.handle(&event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

/// Runs the HTTP server for `serve`; otherwise hands the dispatcher back.
#[cfg(feature = "server")]
async fn serve(
    dispatcher: RequestDispatcher,
    arg: Option<&str>,
) -> std::io::Result<Option<RequestDispatcher>> {
    if arg != Some("serve") {
        return Ok(Some(dispatcher));
    }

    let port = env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(imagegen_gateway::server::DEFAULT_PORT);
    imagegen_gateway::server::run(std::sync::Arc::new(dispatcher), port).await?;
    Ok(None)
}
