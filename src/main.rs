use anyhow::Result;

use urlmap_sync::{app::App, cmd::Command, config::Config, logging::Logger};

fn main() -> Result<()> {
    let cmd = Command::init();

    let config = cmd.apply(Config::load(cmd.config_load_option()?)?);

    if config.logging.enabled {
        Logger::init(&config.logging)?;
    }

    App::run(cmd, config)
}
