use anyhow::Result;

use crate::{cmd::Command, config::Config, logger};

pub struct App;

impl App {
    pub fn run(cmd: Command, config: Config) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        logger!(info, "Start {:?} with {:?}", cmd.subcommand, config);

        let result = runtime.block_on(cmd.subcommand.run(&config));

        if let Err(err) = &result {
            logger!(error, "{:?}", err);
        }

        logger!(info, "End");

        result
    }
}
