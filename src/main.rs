#[macro_use]
extern crate tracing;

use std::{io, path::PathBuf};

use color_eyre::{eyre::Report, Section};
use structopt::StructOpt;
use tokio::runtime::Builder;
use tokio::signal;

use tuxedo_rgb::{
    device::{HardwareError, ZoneWriter},
    effect_runner::EffectRunner,
    effects::{Effect, EffectError},
    models::{self, Color, Config, LoopConfig},
};

#[derive(Debug, StructOpt)]
#[structopt(about = "Control the RGB keyboard of Tuxedo laptops")]
struct Opts {
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u32,
    #[structopt(short, long = "config")]
    config_path: Option<PathBuf>,
    #[structopt(long)]
    dump_config: bool,
    /// Log colors instead of writing them to the keyboard
    #[structopt(long)]
    dummy: bool,
    #[structopt(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, StructOpt)]
struct CycleOpts {
    /// Duration of one cycle in seconds
    #[structopt(long)]
    duration: Option<f64>,
    /// Number of frames in one cycle
    #[structopt(long)]
    steps: Option<u32>,
}

impl CycleOpts {
    fn resolve(&self, default: &LoopConfig) -> LoopConfig {
        LoopConfig::new(
            self.duration.unwrap_or(default.duration),
            self.steps.unwrap_or(default.steps),
        )
    }
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Set the whole keyboard to a solid color
    Solid {
        /// RGB color in format R,G,B (e.g. 255,0,0 for red)
        #[structopt(parse(try_from_str = models::parse_color))]
        color: Color,
    },
    /// Set a single zone to a solid color
    Zone {
        /// left, center or right
        zone: String,
        #[structopt(parse(try_from_str = models::parse_color))]
        color: Color,
    },
    /// Pulse a single color
    Breathing {
        #[structopt(parse(try_from_str = models::parse_color))]
        color: Color,
        #[structopt(flatten)]
        cycle: CycleOpts,
    },
    /// Static rainbow across the zones
    RainbowStatic,
    /// Rainbow moving across the zones
    RainbowWave {
        #[structopt(flatten)]
        cycle: CycleOpts,
    },
    /// Cycle through the colors of a scheme
    ColorCycle {
        /// Color scheme to use (see list-schemes)
        #[structopt(long)]
        scheme: Option<String>,
        #[structopt(flatten)]
        cycle: CycleOpts,
    },
    /// List available color schemes
    ListSchemes,
    /// Reset the keyboard to white
    Reset,
}

/// Suggested fixes for a failed command
fn remedies(error: &EffectError) -> Vec<&'static str> {
    match error {
        EffectError::Hardware(HardwareError::HardwareUnavailable { .. }) => vec![
            "this tool requires a Tuxedo laptop with an RGB keyboard",
            "the tuxedo-keyboard kernel module must be loaded",
            "root privileges are needed to access the LED controls",
        ],
        EffectError::Hardware(HardwareError::WriteFailed { source, .. }) => {
            match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    vec!["root privileges are needed to write to the LED controls"]
                }
                io::ErrorKind::NotFound => {
                    vec!["the tuxedo-keyboard kernel module was unloaded, load it again"]
                }
                _ => vec!["check the kernel log for tuxedo-keyboard errors"],
            }
        }
        _ => Vec::new(),
    }
}

fn hardware_report(error: EffectError) -> Report {
    let remedies = remedies(&error);

    remedies
        .into_iter()
        .fold(Report::new(error), |report, remedy| report.suggestion(remedy))
}

async fn connect(config: &Config) -> Result<EffectRunner, EffectError> {
    let writer = ZoneWriter::new(&config.device).await?;
    Ok(EffectRunner::new(writer))
}

/// Run a looped effect until ctrl-c or a failure
async fn run_loop(config: &Config, effect: Effect) -> Result<(), EffectError> {
    let mut runner = connect(config).await?;

    println!("Starting {} effect, press Ctrl+C to stop", effect.name());
    runner.start(effect).await?;

    let ended = tokio::select! {
        result = runner.wait() => Some(result),
        _ = signal::ctrl_c() => None,
    };

    match ended {
        Some(result) => result,
        None => {
            println!("Stopping effect...");
            runner.stop().await
        }
    }
}

async fn run_command(config: &Config, command: Command) -> Result<(), EffectError> {
    match command {
        Command::Solid { color } => {
            println!("Setting keyboard to color {:?}", color.into_components());
            connect(config)
                .await?
                .apply(Effect::Solid { color })
                .await
        }
        Command::Zone { zone, color } => {
            let runner = connect(config).await?;
            Ok(runner.writer().set_zone_by_name(&zone, color).await?)
        }
        Command::Breathing { color, cycle } => {
            let cycle = cycle.resolve(&config.effects.breathing);
            run_loop(config, Effect::Breathing { color, cycle }).await
        }
        Command::RainbowStatic => {
            println!("Setting static rainbow effect");
            connect(config).await?.apply(Effect::RainbowStatic).await
        }
        Command::RainbowWave { cycle } => {
            let cycle = cycle.resolve(&config.effects.rainbow_wave);
            run_loop(config, Effect::RainbowWave { cycle }).await
        }
        Command::ColorCycle { scheme, cycle } => {
            let scheme = scheme.as_deref().unwrap_or(&config.effects.default_scheme);
            // Unknown schemes are rejected before the keyboard is touched
            let effect = Effect::color_cycle(scheme, cycle.resolve(&config.effects.color_cycle))?;
            run_loop(config, effect).await
        }
        Command::ListSchemes => {
            println!("Available color schemes:");
            for name in EffectRunner::list_schemes() {
                println!("  - {}", name);
            }
            Ok(())
        }
        Command::Reset => {
            println!("Resetting keyboard to white");
            connect(config).await?.reset().await
        }
    }
}

async fn run(opts: Opts) -> color_eyre::eyre::Result<()> {
    // Load configuration
    let mut config = Config::load(opts.config_path.as_deref()).await?;
    if opts.dummy {
        config.device.kind = models::DeviceKind::Dummy;
    }

    // Dump configuration if this was asked
    if opts.dump_config {
        print!("{}", config.to_string()?);
        return Ok(());
    }

    let command = match opts.command {
        Some(command) => command,
        None => {
            Opts::clap().print_help()?;
            println!();
            return Ok(());
        }
    };

    debug!(?command, "running command");
    run_command(&config, command).await.map_err(hardware_report)
}

fn install_tracing(opts: &Opts) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer().with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_env("TUXEDO_RGB_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match opts.verbose {
            0 => "tuxedo_rgb=warn",
            1 => "tuxedo_rgb=info",
            2 => "tuxedo_rgb=debug",
            _ => "tuxedo_rgb=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
}

#[paw::main]
fn main(opts: Opts) -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    install_tracing(&opts)?;

    // Effects run on their own task while the main task waits for ctrl-c
    let rt = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    rt.block_on(run(opts))
}
