use std::path::PathBuf;

use anyhow::{Context as _, bail};
use rocket_folio::{
    flow,
    settings::{SETTINGS_FILE_PATH, Settings},
};

struct Args {
    settings: PathBuf,
    seed: Option<u64>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        settings: PathBuf::from(SETTINGS_FILE_PATH),
        seed: None,
    };
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" | "-c" => {
                let Some(path) = iter.next() else {
                    bail!("--settings requires a path");
                };
                args.settings = PathBuf::from(path);
            }
            "--seed" | "-s" => {
                let Some(val) = iter.next() else {
                    bail!("--seed requires a value");
                };
                args.seed = Some(val.parse::<u64>().context("seed must be a valid integer")?);
            }
            "--help" | "-h" => {
                println!("Usage: rocket-folio [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --settings <PATH>  YAML settings file (default {})", SETTINGS_FILE_PATH);
                println!("  -s, --seed <INT>       Seed for every random placement");
                println!("  -h, --help             Print help");
                std::process::exit(0);
            }
            other => bail!("Unknown argument: {}", other),
        }
    }

    Ok(args)
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    flow::init_logging();

    let mut settings = Settings::load_or_default(&args.settings);
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    log::info!("Launching with seed {}", settings.seed);

    rocket_folio::launch(settings)
}
