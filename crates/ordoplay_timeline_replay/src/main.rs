// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless timeline editing host.
//!
//! Loads a timeline project, replays a scripted list of editor inputs
//! against it and writes the resulting project back out:
//!
//! ```text
//! timeline_replay <project.ron> <script.ron> [--settings settings.ron] [--out out.ron]
//! ```
//!
//! Without `--out` the project is printed to stdout.

mod error;
mod script;

use error::{ReplayError, Result};
use ordoplay_editor_timeline::{Project, TimelineSettings, WindowState};
use script::{load_script, Session};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
struct Args {
    project: PathBuf,
    script: PathBuf,
    settings: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut positional = Vec::new();
        let mut settings = None;
        let mut out = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--settings" | "--out" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ReplayError::Usage(format!("{} needs a path", arg)))?;
                    if arg == "--settings" {
                        settings = Some(PathBuf::from(value));
                    } else {
                        out = Some(PathBuf::from(value));
                    }
                }
                flag if flag.starts_with("--") => {
                    return Err(ReplayError::Usage(format!("unknown option {}", flag)));
                }
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let [project, script] = <[PathBuf; 2]>::try_from(positional)
            .map_err(|_| ReplayError::Usage("expected a project and a script".into()))?;
        Ok(Self {
            project,
            script,
            settings,
            out,
        })
    }
}

fn run(args: &Args) -> Result<()> {
    let project = Project::load(&args.project)?;
    let settings = match &args.settings {
        Some(path) => TimelineSettings::load(path)?,
        None => TimelineSettings::default(),
    };
    let steps = load_script(&args.script)?;

    let edit_sequence = *project.timelines.keys().next().ok_or(ReplayError::NoTimeline)?;
    tracing::info!(
        "Replaying {} steps on '{}'",
        steps.len(),
        project.timeline(edit_sequence).map_or("", |t| t.name.as_str())
    );

    let mut session = Session::new(WindowState::with_settings(project, edit_sequence, settings));
    session.run(&steps)?;

    match &args.out {
        Some(path) => {
            session.state.project.save(path)?;
            tracing::info!("Wrote {:?}", path);
        }
        None => println!("{}", session.state.project.to_ron()?),
    }
    Ok(())
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .add_directive(
            "ordoplay_editor_timeline=debug"
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::DEBUG.into()),
        );

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = Args::parse(std::env::args().skip(1)).and_then(|args| run(&args));
    if let Err(e) = result {
        tracing::error!("Replay failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["p.ron", "s.ron", "--out", "o.ron"]).unwrap();
        assert_eq!(parsed.project, PathBuf::from("p.ron"));
        assert_eq!(parsed.script, PathBuf::from("s.ron"));
        assert_eq!(parsed.out, Some(PathBuf::from("o.ron")));
        assert_eq!(parsed.settings, None);
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(matches!(args(&["p.ron"]), Err(ReplayError::Usage(_))));
        assert!(matches!(args(&["p.ron", "s.ron", "--verbose"]), Err(ReplayError::Usage(_))));
        assert!(matches!(args(&["p.ron", "s.ron", "--settings"]), Err(ReplayError::Usage(_))));
    }
}
