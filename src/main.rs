use std::{env, process};

use anyhow::Context;
use log::{info, warn};

use ilp_network_models::config;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <config.json> <output-base>", args[0]);
        process::exit(1);
    }

    let (config_path, output_base) = (&args[1], &args[2]);

    let config = config::load_config(config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;

    let mut network = config
        .build_network()
        .context("failed to build the network")?;

    let dataset = config
        .dataset()
        .context("failed to prepare the dataset")?;
    info!("training on {} samples", dataset.len());

    let mut strategy = config.strategy(dataset);
    let report = network
        .train(strategy.as_mut())
        .context("training failed")?;

    network.inspect();

    network
        .save(output_base)
        .with_context(|| format!("failed to save the network to {output_base}"))?;

    if !report.converged {
        warn!(
            "stopped after {} iterations with error {} above {}",
            report.iterations,
            report.error,
            network.max_error()
        );
    }

    Ok(())
}
