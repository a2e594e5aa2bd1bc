//! Application lifecycle: read both inputs, run the engine, print results.

use crate::cli::CliArgs;
use crate::config::{AppConfig, OutputFormat};
use anyhow::{anyhow, Context, Result};
use clash_engine::{ClashEngine, ClashResultSequence};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Main application structure.
#[derive(Debug)]
pub struct Application {
    args: CliArgs,
    config: AppConfig,
}

impl Application {
    /// Loads the configuration file and applies command-line overrides.
    pub fn new(args: CliArgs) -> Result<Self> {
        let mut config = AppConfig::load_from_file(&args.config_path)
            .map_err(|e| anyhow!("failed to load {}: {e}", args.config_path.display()))?;
        config.apply_cli_overrides(&args);
        config.validate().map_err(|e| anyhow!(e))?;
        Ok(Self { args, config })
    }

    /// Effective configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the clash scan and writes results to stdout.
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_writer(&mut out)
    }

    /// Runs the clash scan and writes results to `out`.
    pub fn run_with_writer(&self, out: &mut dyn Write) -> Result<()> {
        let set_a = read_input(&self.args.set_a)?;
        let set_b = read_input(&self.args.set_b)?;

        let engine = ClashEngine::new(self.config.engine.clone())?;
        let report = engine
            .detect(&set_a, &set_b, self.config.threshold)
            .context("clash detection failed")?;

        info!(
            clashes = report.stats.clashes_found,
            candidates = report.stats.candidates_examined,
            probes = report.stats.probe_entities,
            indexed = report.stats.indexed_entities,
            parallel = report.stats.parallel,
            "🎯 Clash scan finished"
        );

        render(&report.results, self.config.output.format, out)?;
        out.flush()?;
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Writes results in the requested format.
pub fn render(results: &ClashResultSequence, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "results: {}", results.len())?;
            for dist in results.distances() {
                writeln!(out, "{dist}")?;
            }
        }
        OutputFormat::Pairs => {
            for result in results {
                writeln!(out, "{}\t{}\t{}", result.a, result.b, result.dist)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn app_for(dir: &Path, a: &str, b: &str, extra: &[&str]) -> Application {
        let path_a = dir.join("set_a.txt");
        let path_b = dir.join("set_b.txt");
        fs::write(&path_a, a).expect("write set A");
        fs::write(&path_b, b).expect("write set B");

        let config_path = dir.join("clash.toml");
        let mut argv = vec![
            "clash".to_string(),
            path_a.display().to_string(),
            path_b.display().to_string(),
            "--config".to_string(),
            config_path.display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Application::new(CliArgs::try_parse_from(argv).expect("args parse")).expect("app builds")
    }

    fn output(app: &Application) -> String {
        let mut buf = Vec::<u8>::new();
        app.run_with_writer(&mut buf).expect("run succeeds");
        String::from_utf8(buf).expect("utf-8 output")
    }

    #[test]
    fn test_text_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = app_for(dir.path(), "0 0 0 1 A1\n", "2 0 0 1 B1\n5 0 0 0.1 B2\n", &[]);
        assert_eq!(output(&app), "results: 1\n2\n");
    }

    #[test]
    fn test_pairs_and_json_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = app_for(dir.path(), "0 0 0 1 A1\n", "1.5 0 0 1 B1\n", &["-f", "pairs"]);
        assert_eq!(output(&app), "A1\tB1\t1.5\n");

        let app = app_for(dir.path(), "0 0 0 1 A1\n", "1.5 0 0 1 B1\n", &["-f", "json"]);
        let value: serde_json::Value = serde_json::from_str(&output(&app)).expect("valid json");
        assert_eq!(value[0]["dist"], 1.5);
        assert_eq!(value[0]["b"]["label"], "B1");
    }

    #[test]
    fn test_threshold_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = app_for(dir.path(), "0 0 0\n", "3 0 0\n", &["--threshold", "2.5"]);
        assert_eq!(output(&app), "results: 0\n");
        let app = app_for(dir.path(), "0 0 0\n", "3 0 0\n", &["--threshold", "3"]);
        assert_eq!(output(&app), "results: 1\n3\n");
    }

    #[test]
    fn test_errors_surface() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = app_for(dir.path(), "0 0 0\n", "0 0\n", &[]);
        let err = app.run_with_writer(&mut Vec::<u8>::new()).expect_err("bad input");
        assert!(format!("{err:#}").contains("line 1"), "{err:#}");

        let args = CliArgs::try_parse_from(["clash", "/nonexistent/a", "/nonexistent/b", "-c", "/nonexistent/c.toml"])
            .expect("args parse");
        let app = Application::new(args).expect("missing config falls back to defaults");
        let err = app.run_with_writer(&mut Vec::<u8>::new()).expect_err("missing input");
        assert!(err.to_string().contains("failed to read"), "{err}");
    }
}
