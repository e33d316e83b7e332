mod effects;
mod logging;

use anyhow::Context;
use effects::Effect;
use jackwrap_engine::{AudioClientHandle, ClientConfig, Error, ServerEvent};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ClientConfig::from_env().context("Failed to load client config")?;
    let effect = Effect::from_env()?;

    let mut client = AudioClientHandle::new(config);
    let identity = client.open(effect.callback())?;
    info!("Client '{}' running {:?}", identity.assigned, effect);

    let report = match client.run() {
        Ok(report) => report,
        Err(e) => {
            if e.is_fatal() {
                client.close();
            }
            return Err(e.into());
        }
    };
    if !report.is_fully_connected() {
        warn!("Running partially connected: {:?}", report.failures);
    }

    let mut events = client
        .take_events()
        .context("Server notifications already taken")?;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, closing client");
                break;
            }
            event = events.recv() => match event {
                Some(ServerEvent::BufferSizeChanged { frames }) => {
                    warn!("Server buffer size changed to {frames} frames");
                }
                Some(ServerEvent::Shutdown { reason }) => {
                    client.close();
                    return Err(Error::ServerShutdown { reason }.into());
                }
                None => {
                    client.close();
                    return Err(Error::ServerShutdown {
                        reason: "notification channel closed".to_string(),
                    }
                    .into());
                }
            },
        }
    }

    client.close();
    Ok(())
}
