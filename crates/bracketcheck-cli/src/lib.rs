//! Shared entry point for the `partone` and `parttwo` executables.
//!
//! Both binaries read the same header protocol from stdin and differ only in
//! the [`OutputVariant`] they render with.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use bracketcheck_core::config::{self, Config};
use bracketcheck_core::tracing_init::init_tracing;
use bracketcheck_core::{OutputVariant, Preset, Session, Summary};

/// Bracket balance validator.
///
/// Reads a test case count, a line count and that many lines from stdin and
/// prints one verdict per line.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Built-in bracket grammar (`ordered` or `nested`)
    #[arg(long)]
    pub grammar: Option<Preset>,

    /// JSON settings file
    #[arg(long, env = "BRACKETCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Evaluation workers (1 = sequential, 0 = one per core)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Emit JSON log lines on stderr
    #[arg(long, env = "BRACKETCHECK_LOG_JSON")]
    pub log_json: bool,
}

/// Resolve settings files and environment, then apply CLI flags on top.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = config::load_config(args.config.as_deref())
        .context("failed to load configuration")?;
    apply_args(&mut config, args);
    Ok(config)
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(preset) = args.grammar {
        config.grammar.preset = preset;
        config.grammar.custom = None;
    }
    if let Some(jobs) = args.jobs {
        config.session.jobs = jobs;
    }
    if args.log_json {
        config.log.json = true;
    }
}

/// Run one session over `input`, writing verdicts to `output`.
pub fn run<R: BufRead, W: Write>(
    variant: OutputVariant,
    config: &Config,
    input: R,
    output: W,
) -> Result<Summary> {
    let grammar = config
        .grammar
        .resolve()
        .context("invalid bracket grammar")?;
    let session = Session::new(grammar, variant).with_jobs(config.session.jobs);
    let summary = session.run(input, output).context("failed to process input")?;
    debug!(?summary, "done");
    Ok(summary)
}

/// Process entry point shared by both binaries.
pub fn main_for(variant: OutputVariant) -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;
    init_tracing(&config.log.level, config.log.json);

    run(variant, &config, io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("partone").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_is_valid() {
        let args = args(&[]);
        assert!(args.grammar.is_none());
        assert!(args.jobs.is_none());
    }

    #[test]
    fn grammar_flag_parses_preset() {
        assert_eq!(args(&["--grammar", "nested"]).grammar, Some(Preset::Nested));
        assert!(Args::try_parse_from(["partone", "--grammar", "loose"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        config.grammar.custom = Some(bracketcheck_core::GrammarDef::nested());
        apply_args(&mut config, &args(&["--grammar", "nested", "-j", "3", "--log-json"]));

        assert_eq!(config.grammar.preset, Preset::Nested);
        assert!(config.grammar.custom.is_none());
        assert_eq!(config.session.jobs, 3);
        assert!(config.log.json);
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = Config::default();
        config.session.jobs = 5;
        apply_args(&mut config, &args(&[]));
        assert_eq!(config.session.jobs, 5);
        assert_eq!(config.grammar.preset, Preset::Ordered);
    }

    #[test]
    fn run_writes_verdicts() {
        let mut out = Vec::new();
        let summary = run(
            OutputVariant::PartTwo,
            &Config::default(),
            Cursor::new("1\n2\n({})\n[]\n"),
            &mut out,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1:true\n2:false\n");
        assert_eq!(summary.processed, 2);
    }

    #[test]
    fn run_reports_header_error() {
        let mut out = Vec::new();
        let err = run(
            OutputVariant::PartOne,
            &Config::default(),
            Cursor::new("four\n"),
            &mut out,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("four"), "{err:#}");
        assert!(out.is_empty());
    }
}
