//! Cadence CLI - run scheduler scenarios and clock-driven simulations

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{scenario, simulate};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Deterministic phased lifecycle scheduler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one of the reference scenarios and print its callback trace
    Scenario {
        /// Scenario to run
        #[arg(value_enum)]
        name: scenario::ScenarioName,

        /// Number of frames to run
        #[arg(long, default_value = "3")]
        frames: usize,

        /// FixedUpdate substeps per frame (comma-separated, last value repeats)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        substeps: Vec<i64>,
    },

    /// Drive demo components with substep counts from the fixed-timestep clock
    Simulate {
        /// Path to a scheduler config file (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Number of frames to run
        #[arg(long, default_value = "10")]
        frames: usize,

        /// Simulated wall time per frame, in seconds
        #[arg(long, default_value = "0.016")]
        frame_time: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cadence=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scenario {
            name,
            frames,
            substeps,
        } => scenario::run(scenario::ScenarioArgs {
            name,
            frames,
            substeps,
        }),
        Commands::Simulate {
            config,
            frames,
            frame_time,
        } => simulate::run(simulate::SimulateArgs {
            config,
            frames,
            frame_time,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_arguments() {
        let cli = Cli::try_parse_from(["cadence", "scenario", "b", "--frames", "2", "--substeps", "2,0"])
            .unwrap();
        let Commands::Scenario {
            name,
            frames,
            substeps,
        } = cli.command
        else {
            panic!("expected scenario command");
        };
        assert_eq!(name, scenario::ScenarioName::B);
        assert_eq!(frames, 2);
        assert_eq!(substeps, vec![2, 0]);
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::try_parse_from(["cadence", "simulate"]).unwrap();
        let Commands::Simulate {
            config,
            frames,
            frame_time,
        } = cli.command
        else {
            panic!("expected simulate command");
        };
        assert!(config.is_none());
        assert_eq!(frames, 10);
        assert!((frame_time - 0.016).abs() < 1e-12);
    }
}
