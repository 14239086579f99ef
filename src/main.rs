use anyhow::Result;
use crossbeam::channel;
use env_logger::Env;
use log::info;
use rand::{rngs::StdRng, SeedableRng};

mod args;
mod audio;
mod checker;
mod config;
mod console;
mod exercises;
mod generator;
mod misc;

use audio::{
    devices::{self, OutputStream},
    player::Player,
};
use config::Settings;
use exercises::InitContext;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = args::parse_args()?;

    // Command line first, then the config file, then the exercise defaults
    let file = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let config = args.settings.clone().or(file).resolve(args.defaults);
    info!("Settings: {config:?}");

    // Setup audio device
    let output = devices::get_output(&args.output_device, args.output_gain)?;
    println!(
        "[*] Output hooked into `{}` ({})",
        output.name(),
        output.sample_rate().0
    );

    let (tx, rx) = channel::unbounded();
    let player = Player::new(output.sample_rate(), tx);
    let stream = OutputStream::new(&output, player.clone())?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let exercise = exercises::build(
        args.kind,
        InitContext {
            config,
            player: player.clone(),
            rng,
        },
    );
    println!("[*] Running exercise `{}`", exercise.name());

    console::Console::new(exercise, player, stream, rx).run()
}
