use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use future_timeline_core::{
    eras, AppConfig, AssetResolver, ChannelKind, Experience, RecordingBackend, TimelineError,
};
use tracing_subscriber::EnvFilter;

fn main() -> future_timeline_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eras { json } => list_eras(json),
        Commands::Resolve {
            channel,
            era,
            config,
        } => run_resolve(channel, era, config.as_ref()),
        Commands::Simulate {
            script,
            config,
            tick_ms,
            block_autoplay,
        } => run_simulate(&script, config.as_ref(), tick_ms, block_autoplay),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&AppConfig::default())?);
            Ok(())
        }
    }
}

fn list_eras(json: bool) -> future_timeline_core::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(eras())?);
        return Ok(());
    }
    for era in eras() {
        println!("{:>2}  {:<28} {}", era.index, era.engine_label, era.title);
    }
    Ok(())
}

fn run_resolve(
    channel: ChannelArg,
    era: usize,
    config: Option<&PathBuf>,
) -> future_timeline_core::Result<()> {
    if future_timeline_core::era(era).is_none() {
        return Err(TimelineError::EraOutOfRange(era));
    }
    let config = load_config(config)?;
    let resolver = AssetResolver::new(config.assets.clone());
    for address in resolver.resolve(&config.audio, channel.into(), era) {
        println!("{address}");
    }
    Ok(())
}

fn run_simulate(
    script: &str,
    config: Option<&PathBuf>,
    tick_ms: u64,
    block_autoplay: bool,
) -> future_timeline_core::Result<()> {
    let config = load_config(config)?;
    let steps = script
        .split(',')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(ScriptStep::from_str)
        .collect::<future_timeline_core::Result<Vec<_>>>()?;

    let backend = if block_autoplay {
        RecordingBackend::new().with_autoplay_blocked()
    } else {
        RecordingBackend::new()
    };
    let mut experience = Experience::new(backend, config);
    let tick = Duration::from_millis(tick_ms.max(1));

    tracing::info!(steps = steps.len(), ?tick, "starting simulation");
    for step in steps {
        let outcome = match step {
            ScriptStep::Start => experience.start(),
            ScriptStep::Next => experience.next(),
            ScriptStep::Previous => experience.previous(),
            ScriptStep::Jump(era) => experience.jump_to(era),
            ScriptStep::Restart => experience.restart(),
            ScriptStep::Mute => {
                experience.toggle_mute();
                Ok(())
            }
            ScriptStep::Enable => {
                experience.enable_audio();
                Ok(())
            }
            ScriptStep::Gesture => {
                experience.user_gesture();
                Ok(())
            }
            ScriptStep::Wait(total) => {
                let mut waited = Duration::ZERO;
                while waited < total {
                    let delta = tick.min(total - waited);
                    experience.advance_clock(delta);
                    waited += delta;
                }
                Ok(())
            }
        };
        if let Err(err) = outcome {
            tracing::warn!(?step, %err, "step ignored");
        }
        report(&experience, &step);
    }

    let playing: Vec<_> = experience.audio().backend().playing().collect();
    println!("{}", serde_json::to_string_pretty(&playing)?);
    Ok(())
}

fn report(experience: &Experience<RecordingBackend>, step: &ScriptStep) {
    let session = experience.session();
    tracing::info!(
        ?step,
        at_ms = u64::try_from(experience.now().as_millis()).unwrap_or(u64::MAX),
        screen = %session.screen(),
        era = session.active_era(),
        muted = session.muted(),
        "step applied"
    );
    for kind in [ChannelKind::Ambient, ChannelKind::Voiceover, ChannelKind::Music] {
        if let Some(status) = experience.audio().status(kind) {
            tracing::info!(
                channel = %kind,
                key = status.key,
                volume = status.volume,
                playing = status.playing,
                fading = status.fading,
                "channel"
            );
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> future_timeline_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::from_json_file(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptStep {
    Start,
    Next,
    Previous,
    Jump(usize),
    Restart,
    Mute,
    Enable,
    Gesture,
    Wait(Duration),
}

impl FromStr for ScriptStep {
    type Err = TimelineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };
        match name.trim() {
            "start" => Ok(Self::Start),
            "next" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Previous),
            "jump" => Ok(Self::Jump(numeric_arg(raw, arg)?)),
            "restart" => Ok(Self::Restart),
            "mute" => Ok(Self::Mute),
            "enable" => Ok(Self::Enable),
            "gesture" => Ok(Self::Gesture),
            "wait" => Ok(Self::Wait(Duration::from_millis(numeric_arg(raw, arg)?))),
            other => Err(TimelineError::msg(format!("unknown script step `{other}`"))),
        }
    }
}

fn numeric_arg<T: FromStr>(raw: &str, arg: Option<&str>) -> Result<T, TimelineError> {
    arg.and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| TimelineError::msg(format!("`{raw}` needs a numeric argument")))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelArg {
    Ambient,
    Voiceover,
    Music,
}

impl From<ChannelArg> for ChannelKind {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Ambient => ChannelKind::Ambient,
            ChannelArg::Voiceover => ChannelKind::Voiceover,
            ChannelArg::Music => ChannelKind::Music,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio sequencer for The History of the Future", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the eras of the narrative.
    Eras {
        /// Print the full catalog as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the candidate asset addresses for a channel at an era.
    Resolve {
        #[arg(value_enum)]
        channel: ChannelArg,
        era: usize,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Drive a headless session through a comma-separated script.
    Simulate {
        /// Steps: start, next, prev, jump:N, mute, enable, restart, gesture, wait:MS.
        #[arg(short, long, default_value = "start,wait:3000,next,wait:3000,mute,wait:500,mute,jump:14,wait:3000,restart")]
        script: String,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Virtual clock resolution in milliseconds.
        #[arg(long, default_value_t = 50)]
        tick_ms: u64,
        /// Refuse playback until a `gesture` step.
        #[arg(long)]
        block_autoplay: bool,
    },
    /// Print the default configuration as JSON.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_script_steps() {
        assert_eq!("start".parse::<ScriptStep>().unwrap(), ScriptStep::Start);
        assert_eq!("prev".parse::<ScriptStep>().unwrap(), ScriptStep::Previous);
        assert_eq!("jump:12".parse::<ScriptStep>().unwrap(), ScriptStep::Jump(12));
        assert_eq!(
            "wait:250".parse::<ScriptStep>().unwrap(),
            ScriptStep::Wait(Duration::from_millis(250))
        );
    }

    #[test]
    fn rejects_bad_steps() {
        assert!("jump".parse::<ScriptStep>().is_err());
        assert!("wait:soon".parse::<ScriptStep>().is_err());
        assert!("share".parse::<ScriptStep>().is_err());
        assert!("jump:-1".parse::<ScriptStep>().is_err());
        assert!("jump:99999999999999999999999".parse::<ScriptStep>().is_err());
        assert!("wait:99999999999999999999999".parse::<ScriptStep>().is_err());
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::parse_from(["future-timeline", "simulate", "--script", "start,next", "--block-autoplay"]);
        match cli.command {
            Commands::Simulate {
                script,
                block_autoplay,
                tick_ms,
                ..
            } => {
                assert_eq!(script, "start,next");
                assert!(block_autoplay);
                assert_eq!(tick_ms, 50);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
