use nihilator_engine::device::GpuInit;
use nihilator_engine::logging::{init_logging, LoggingConfig};
use nihilator_engine::window::{GameCore, RuntimeConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        default_image: "images/default.bmp".into(),
        sprite_sheet: Some("images/sprites.png".into()),
        ..RuntimeConfig::default()
    };

    log::info!("starting {}", config.title);
    let result = GameCore::new(config, GpuInit::default()).run();
    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}
