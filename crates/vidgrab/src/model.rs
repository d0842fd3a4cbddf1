//! The extractor side of the application.
//!
//! [`Model`] is the seam the presenter talks to. [`YtDlp`] implements it by
//! running the `yt-dlp` executable: `--dump-single-json` for video info and
//! `-f <format>` for downloads, with progress lines streamed from stderr.
//!
//! The URL `zipped` is answered from a sample document bundled into the
//! binary, so the interface can be exercised offline.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use flate2::read::GzDecoder;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::logging::targets;
use crate::postprocess;
use crate::video::VideoInfo;

/// URL answered with the bundled sample document.
pub const SAMPLE_URL: &str = "zipped";

static SAMPLE_INFO: &[u8] = include_bytes!("../data/sample-info.json.gz");

/// Source of video info and downloads.
pub trait Model {
    /// Fetch info for `url` and keep it as the current info.
    ///
    /// A failed fetch leaves no current info.
    fn video_info(&mut self, url: &str) -> Result<&VideoInfo>;

    /// The info of the last successful fetch.
    fn current(&self) -> Option<&VideoInfo>;

    /// Forget the current info.
    fn clear_video_info(&mut self);

    /// Download `url` in the selected format, reporting each progress line.
    ///
    /// Returns the path of the downloaded file when the extractor reports
    /// one.
    fn download(
        &mut self,
        url: &str,
        format: &str,
        progress: &mut dyn FnMut(&str),
    ) -> Result<Option<PathBuf>>;
}

/// Decompress and parse the bundled sample document.
pub fn sample_video_info() -> Result<VideoInfo> {
    let mut json = String::new();
    GzDecoder::new(SAMPLE_INFO).read_to_string(&mut json)?;
    VideoInfo::from_json(&json)
}

fn is_sample(url: &str) -> bool {
    url.trim().eq_ignore_ascii_case(SAMPLE_URL)
}

/// [`Model`] backed by the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    args: Vec<OsString>,
    download_dir: Option<PathBuf>,
    sanitize_file_names: bool,
    info: Option<VideoInfo>,
}

impl YtDlp {
    /// Run `program` for every extractor call.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            download_dir: None,
            sanitize_file_names: false,
            info: None,
        }
    }

    /// Extractor, download directory and file name handling from settings.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.extractor)
            .with_args(&config.extractor_args)
            .with_download_dir(config.download_dir.clone())
            .with_sanitized_file_names(config.sanitize_file_names)
    }

    /// Arguments placed before every call's own, e.g. `-m yt_dlp` when the
    /// program is a Python interpreter.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Directory downloads are written to.
    pub fn with_download_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.download_dir = dir;
        self
    }

    /// Rename downloads to sanitized file names.
    pub fn with_sanitized_file_names(mut self, sanitize: bool) -> Self {
        self.sanitize_file_names = sanitize;
        self
    }

    /// The extractor program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null());
        command
    }

    fn spawn_error(&self, err: std::io::Error) -> AppError {
        if err.kind() == std::io::ErrorKind::NotFound {
            AppError::Extractor(format!("{} not found", self.program.display()))
        } else {
            AppError::Io(err)
        }
    }

    fn extract(&self, url: &str) -> Result<VideoInfo> {
        if is_sample(url) {
            tracing::debug!(target: targets::MODEL, "loading bundled sample info");
            return sample_video_info();
        }

        tracing::info!(target: targets::MODEL, url, program = %self.program.display(), "extracting video info");
        let output = self
            .command()
            .args(["--dump-single-json", "--no-playlist", "--no-warnings", "--"])
            .arg(url)
            .output()
            .map_err(|err| self.spawn_error(err))?;
        if !output.status.success() {
            return Err(AppError::Extractor(failure_message(&String::from_utf8_lossy(
                &output.stderr,
            ))));
        }
        VideoInfo::from_json(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Model for YtDlp {
    fn video_info(&mut self, url: &str) -> Result<&VideoInfo> {
        self.info = None;
        let info = self.extract(url)?;
        tracing::info!(target: targets::MODEL, %info, "video info extracted");
        Ok(self.info.insert(info))
    }

    fn current(&self) -> Option<&VideoInfo> {
        self.info.as_ref()
    }

    fn clear_video_info(&mut self) {
        self.info = None;
    }

    fn download(
        &mut self,
        url: &str,
        format: &str,
        progress: &mut dyn FnMut(&str),
    ) -> Result<Option<PathBuf>> {
        if is_sample(url) {
            return Err(AppError::Extractor("the bundled sample cannot be downloaded".into()));
        }

        let mut command = self.command();
        command.args(["-f", format, "--newline", "--progress", "--no-playlist"]);
        command.args(["--print", "after_move:filepath"]);
        if let Some(dir) = &self.download_dir {
            command.arg("-P").arg(dir);
        }
        command
            .arg("--")
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::info!(target: targets::MODEL, url, format, "starting download");
        let mut child = command.spawn().map_err(|err| self.spawn_error(err))?;

        let mut last_line = String::new();
        if let Some(stderr) = child.stderr.take() {
            for line in BufReader::new(stderr).lines() {
                let line = line?;
                let line = line.trim_end();
                if line.is_empty() {
                    continue;
                }
                tracing::debug!(target: targets::MODEL, "{line}");
                progress(line);
                line.clone_into(&mut last_line);
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(AppError::Extractor(failure_message(&last_line)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(path) = stdout.lines().map(str::trim).rfind(|line| !line.is_empty()) else {
            return Ok(None);
        };
        let path = PathBuf::from(path);
        tracing::info!(target: targets::MODEL, path = %path.display(), "download finished");
        if self.sanitize_file_names && path.exists() {
            return postprocess::rename_sanitized(&path).map(Some);
        }
        Ok(Some(path))
    }
}

/// Last non-empty stderr line, without the `ERROR:` prefix.
fn failure_message(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(|line| line.strip_prefix("ERROR:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "extractor exited without a message".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_info() {
        let info = sample_video_info().unwrap();
        assert!(info.title.starts_with("Rick Astley"));
        assert_eq!(info.duration.to_string(), "3:33");
        assert_eq!(info.formats.len(), 8);
        assert_eq!(info.formats[0].format_id, "sb0");
    }

    #[test]
    fn test_zipped_url_sets_current() {
        let mut model = YtDlp::new("/nonexistent/yt-dlp");
        let title = model.video_info(" ZIPPED ").unwrap().title.clone();
        assert_eq!(model.current().map(|info| info.title.as_str()), Some(title.as_str()));
        model.clear_video_info();
        assert!(model.current().is_none());
    }

    #[test]
    fn test_missing_extractor() {
        let mut model = YtDlp::new("/nonexistent/yt-dlp");
        model.video_info(SAMPLE_URL).unwrap();
        let err = model.video_info("https://example.com/watch").unwrap_err();
        assert!(matches!(&err, AppError::Extractor(msg) if msg.contains("not found")));
        assert!(model.current().is_none());
    }

    #[test]
    fn test_sample_cannot_be_downloaded() {
        let mut model = YtDlp::new("/nonexistent/yt-dlp");
        let result = model.download(SAMPLE_URL, "best", &mut |_| {});
        assert!(matches!(result, Err(AppError::Extractor(_))));
    }

    #[test]
    fn test_failure_message() {
        assert_eq!(
            failure_message("WARNING: slow\nERROR: [generic] Unsupported URL: x\n\n"),
            "[generic] Unsupported URL: x"
        );
        assert_eq!(failure_message(""), "extractor exited without a message");
    }

    #[cfg(unix)]
    mod fake_extractor {
        use super::*;

        const SCRIPT: &str = r#"
dir=.
prev=
for arg in "$@"; do
  if [ "$prev" = "-P" ]; then dir="$arg"; fi
  prev="$arg"
  last="$arg"
done
case "$last" in
  *fail*) echo "ERROR: [generic] Unsupported URL: $last" >&2; exit 1 ;;
esac
case " $* " in
  *" --dump-single-json "*)
    printf '%s\n' '{"title": "Fake", "webpage_url": "'"$last"'", "duration": 90, "formats": [{"format_id": "18", "ext": "mp4"}]}' ;;
  *)
    echo "[download]  50.0% of 1.00MiB" >&2
    echo "[download] 100% of 1.00MiB" >&2
    file="$dir/fake clip [18].mp4"
    : > "$file"
    echo "$file" ;;
esac
"#;

        fn fake(dir: &Path) -> YtDlp {
            let script = dir.join("fake-yt-dlp.sh");
            std::fs::write(&script, SCRIPT).unwrap();
            YtDlp::new("sh").with_args([script])
        }

        #[test]
        fn test_extract_via_process() {
            let dir = tempfile::tempdir().unwrap();
            let mut model = fake(dir.path());
            let info = model.video_info("https://example.com/v").unwrap();
            assert_eq!(info.title, "Fake");
            assert_eq!(info.url, "https://example.com/v");
            assert_eq!(info.duration.to_string(), "1:30");
        }

        #[test]
        fn test_extractor_error_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let mut model = fake(dir.path());
            let err = model.video_info("https://example.com/fail").unwrap_err();
            assert!(matches!(&err, AppError::Extractor(msg) if msg == "[generic] Unsupported URL: https://example.com/fail"));
        }

        #[test]
        fn test_download_streams_progress_and_renames() {
            let dir = tempfile::tempdir().unwrap();
            let mut model = fake(dir.path())
                .with_download_dir(Some(dir.path().to_path_buf()))
                .with_sanitized_file_names(true);

            let mut lines = Vec::new();
            let path = model
                .download("https://example.com/v", "18", &mut |line| lines.push(line.to_string()))
                .unwrap();

            assert_eq!(lines.len(), 2);
            assert!(lines[1].contains("100%"));
            let path = path.unwrap();
            assert_eq!(path, dir.path().join("fake_clip_18.mp4"));
            assert!(path.exists());
        }

        #[test]
        fn test_download_failure() {
            let dir = tempfile::tempdir().unwrap();
            let mut model = fake(dir.path());
            let err = model
                .download("https://example.com/fail", "18", &mut |_| {})
                .unwrap_err();
            assert!(matches!(err, AppError::Extractor(_)));
        }
    }
}
