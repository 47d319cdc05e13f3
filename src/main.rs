use anyhow::{Context, Result};
use clap::Parser;
use snake_ql::cli::{Cli, Command};
use snake_ql::play::HumanSession;
use snake_ql::train::Trainer;
use snake_ql::{event_loop, log};

fn main() -> Result<()> {
    log::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Play { speed } => {
            let session = HumanSession::new(speed, None).context("cannot start the game")?;
            event_loop::run(session)?;
        }
        Command::Train(args) => {
            let cfg = args.to_config().context("invalid training configuration")?;
            let mut trainer =
                Trainer::new(&cfg, args.resume.as_deref()).context("cannot start training")?;
            if cfg.headless {
                trainer.run_headless()?;
            } else {
                event_loop::run(trainer)?;
            }
        }
    }
    Ok(())
}
