mod settings;
mod ui;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use mood_core::config::Config;
use mood_core::state::InsightPolicy;
use mood_core::state::MoodState;
use mood_exec::HttpInsightService;
use mood_exec::InsightService;
use mood_exec::SimulatedInsightService;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MOODCANVAS_LOG";

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RunOptions {
    endpoint: Option<String>,
    config_path: Option<PathBuf>,
    simulated: bool,
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1).peekable();
    let first = args.peek().cloned();
    let command = match first.as_deref() {
        Some(arg) if !arg.starts_with("--") || arg == "--help" || arg == "--version" => {
            args.next();
            first
        }
        _ => None,
    };

    match command.as_deref() {
        Some("--help" | "-h" | "help") => {
            print_help();
            Ok(())
        }
        Some("--version" | "-V" | "version") => {
            println!("moodcanvas {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None | Some("run") => {
            let options = parse_run_args(args.collect())?;
            run_journal(options)
        }
        Some(other) => {
            print_help();
            Err(format!("unknown command: {other}").into())
        }
    }
}

fn parse_run_args(args: Vec<String>) -> Result<RunOptions, Box<dyn std::error::Error>> {
    let mut options = RunOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--endpoint requires a URL".into());
                };
                options.endpoint = Some(value.clone());
                i += 2;
            }
            "--config" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--config requires a path".into());
                };
                options.config_path = Some(PathBuf::from(value));
                i += 2;
            }
            "--simulated" => {
                options.simulated = true;
                i += 1;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    Ok(options)
}

fn run_journal(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = match options.config_path.clone().or_else(settings::default_config_path) {
        Some(path) => settings::load_config(&path)?,
        None => Config::default(),
    };
    settings::apply_env_overrides(&mut config, env::var(settings::ENDPOINT_ENV).ok());
    settings::apply_env_overrides(&mut config, options.endpoint);

    let service: Arc<dyn InsightService> = if options.simulated {
        Arc::new(SimulatedInsightService)
    } else {
        Arc::new(HttpInsightService::from_config(&config.insight)?)
    };
    tracing::info!(
        service = service.name(),
        endpoint = %config.insight.endpoint,
        "moodcanvas starting"
    );

    let state = MoodState::new(InsightPolicy::from(&config.insight));
    ui::run(state, service, config.ui)
}

/// Logs go to a file so they never draw over the terminal UI.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file = settings::default_log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    let Some(file) = file else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn print_help() {
    println!(
        "moodcanvas {}

Paint your emotions: pick a mood, write about it, and ask for a short supportive insight.

USAGE:
    moodcanvas [run] [--endpoint URL] [--simulated] [--config PATH]
    moodcanvas help | version

OPTIONS:
    --endpoint URL   Insight service endpoint (overrides config and ${})
    --simulated      Use the offline insight generator instead of HTTP
    --config PATH    Config file (default: <config dir>/moodcanvas/config.toml)

KEYS:
    Tab       switch focus (moods / journal / history)
    1-5       pick a mood        Ctrl-G  get AI insight
    Ctrl-S    save entry         Ctrl-D  discard draft
    Enter     expand entry       y       copy expanded entry
    F2        session log        Esc     quit

Entries live only for this session.",
        env!("CARGO_PKG_VERSION"),
        settings::ENDPOINT_ENV
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn run_flags_are_parsed() {
        let options = parse_run_args(args(&[
            "--simulated",
            "--endpoint",
            "http://localhost:8080",
            "--config",
            "/tmp/mc.toml",
        ]))
        .expect("options");

        assert_eq!(
            options,
            RunOptions {
                endpoint: Some("http://localhost:8080".to_string()),
                config_path: Some(PathBuf::from("/tmp/mc.toml")),
                simulated: true,
            }
        );
    }

    #[test]
    fn missing_flag_values_are_errors() {
        assert!(parse_run_args(args(&["--endpoint"])).is_err());
        assert!(parse_run_args(args(&["--config"])).is_err());
        assert!(parse_run_args(args(&["--verbose"])).is_err());
    }
}
