//! Command line and headless run.
//!
//! [`run`] builds the main window on the headless toolkit, replays the
//! requested actions through the presenter and writes the resulting widget
//! tree and status line. The binary only loads settings and installs
//! logging around it.

use std::io::Write;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use vidgrab_widgets::Toolkit;

use crate::config::Config;
use crate::logging::{LogBuffer, targets};
use crate::model::{Model, YtDlp};
use crate::presenter::Presenter;
use crate::view::MainWindow;

/// Look up an online video and download one of its formats.
#[derive(Parser, Debug, Default)]
#[command(name = "vidgrab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Video URL; `zipped` loads the bundled sample
    #[arg(short, long)]
    pub url: Option<String>,

    /// Format selector to put in the selector entry
    #[arg(short, long)]
    pub format: Option<String>,

    /// Download after fetching the video info
    #[arg(short, long)]
    pub download: bool,

    /// Open the console window
    #[arg(long)]
    pub console: bool,

    /// Settings file (defaults to the platform configuration directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    pub save_config: bool,

    /// Tracing filter, such as `debug` or `vidgrab::model=trace`
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Also append log lines to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Run the requested actions against a fresh main window and print it to `out`.
///
/// Fails when a URL was given but no video info could be fetched for it,
/// or when a requested download fails.
pub fn run(cli: &Cli, config: Config, log: Option<LogBuffer>, out: &mut dyn Write) -> anyhow::Result<()> {
    let toolkit = Toolkit::new();
    let view = MainWindow::new(&toolkit, &config)?;
    let model = YtDlp::from_config(&config);
    tracing::info!(target: targets::APP, extractor = %model.program().display(), "starting");
    let presenter = Presenter::new(model, view, config, log)?;

    if let Some(url) = &cli.url {
        presenter.view().set_url(url)?;
        presenter.get_video_info()?;
    }
    if let Some(format) = &cli.format {
        presenter.view().set_format_selector(format)?;
    }
    if cli.download {
        presenter.download_video()?;
    }
    if cli.console {
        presenter.show_console()?;
    }

    writeln!(out, "{}", presenter.view().render()?)?;
    let status = presenter.view().status().text()?;
    if !status.is_empty() {
        writeln!(out, "{status}")?;
    }

    if let Some(url) = &cli.url
        && presenter.model().current().is_none()
    {
        bail!("no video info for {url}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SAMPLE_URL;

    fn run_to_string(cli: &Cli, config: Config) -> (anyhow::Result<()>, String) {
        let mut out = Vec::new();
        let result = run(cli, config, None, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from(["vidgrab", "--url", "zipped", "-f", "140", "--download"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("zipped"));
        assert_eq!(cli.format.as_deref(), Some("140"));
        assert!(cli.download);
        assert!(!cli.console);
    }

    #[test]
    fn test_run_with_sample() {
        let cli = Cli {
            url: Some(SAMPLE_URL.into()),
            format: Some("140".into()),
            console: true,
            ..Cli::default()
        };
        let (result, output) = run_to_string(&cli, Config::default());

        result.unwrap();
        assert!(output.contains("\"Get Video Info\""));
        assert!(output.contains("= \"140\""));
        assert!(output.contains("\"Close\""));
        assert!(output.trim_end().ends_with("(8 formats)"));
    }

    #[test]
    fn test_run_without_url_prints_empty_window() {
        let (result, output) = run_to_string(&Cli::default(), Config::default());
        result.unwrap();
        assert!(output.contains("\"Download\""));
    }

    #[test]
    fn test_run_fails_without_video_info() {
        let config = Config {
            extractor: PathBuf::from("vidgrab-test-no-such-extractor"),
            ..Config::default()
        };
        let cli = Cli {
            url: Some("https://example.com/watch?v=1".into()),
            ..Cli::default()
        };
        let (result, output) = run_to_string(&cli, config);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("no video info"));
        assert!(output.contains("Error: extractor failed"));
    }

    #[test]
    fn test_run_refuses_sample_download() {
        let cli = Cli {
            url: Some(SAMPLE_URL.into()),
            download: true,
            ..Cli::default()
        };
        let (result, _) = run_to_string(&cli, Config::default());
        assert!(result.unwrap_err().to_string().contains("sample"));
    }
}
