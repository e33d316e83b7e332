use tracing::Level;

pub const LOG_LEVEL_ENV: &str = "JACKWRAP_LOG";

fn level_from(value: Option<&str>) -> Level {
    value
        .and_then(|v| v.trim().parse::<Level>().ok())
        .unwrap_or(Level::INFO)
}

pub fn init() {
    let level = level_from(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
