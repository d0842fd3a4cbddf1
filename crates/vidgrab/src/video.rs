//! Video information as reported by the extractor.
//!
//! The extractor prints one JSON document per video. Only the fields the
//! interface shows are read; everything else is ignored.

use std::fmt;

use serde::Deserialize;

use crate::error::Result;

/// `live_status` value of a stream that is live right now.
const LIVE: &str = "is_live";

/// Minimum age limit shown as age restricted.
pub const AGE_RESTRICTED: u32 = 18;

/// Length of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration {
    /// Whole hours.
    pub hours: u64,
    /// Minutes past the hour, `0..60`.
    pub minutes: u64,
    /// Seconds past the minute, `0..60`.
    pub seconds: u64,
}

impl Duration {
    /// Split a number of seconds.
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: total / 60 % 60,
            seconds: total % 60,
        }
    }

    /// Total number of seconds.
    pub fn as_seconds(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

/// `h:mm:ss`, `m:ss` or `s`.
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            hours,
            minutes,
            seconds,
        } = *self;
        if hours > 0 {
            write!(f, "{hours}:{minutes:02}:{seconds:02}")
        } else if minutes > 0 {
            write!(f, "{minutes}:{seconds:02}")
        } else {
            write!(f, "{seconds}")
        }
    }
}

/// One downloadable format, with the extractor's fields as reported.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FormatRow {
    /// Identifier accepted by the format selector (`-f`).
    pub format_id: String,
    /// File extension.
    pub ext: String,
    /// `WIDTHxHEIGHT`, or `audio only`.
    pub resolution: Option<String>,
    /// Frames per second of video streams.
    pub fps: Option<f64>,
    /// Audio sample rate in Hz.
    pub asr: Option<u64>,
    /// Exact size in bytes.
    pub filesize: Option<u64>,
    /// Estimated size in bytes.
    pub filesize_approx: Option<u64>,
    /// Average total bitrate in kbit/s.
    pub tbr: Option<f64>,
}

impl FormatRow {
    /// Frame rate if known, otherwise the sample rate.
    pub fn rate(&self) -> String {
        match (self.fps, self.asr) {
            (Some(fps), _) if fps > 0.0 => format!("{fps} fps"),
            (_, Some(asr)) if asr > 0 => format!("{asr} Hz"),
            _ => String::new(),
        }
    }

    /// Exact size if known, otherwise the estimate marked with `~`.
    pub fn size(&self) -> String {
        match (self.filesize, self.filesize_approx) {
            (Some(bytes), _) => human_size(bytes),
            (None, Some(bytes)) => format!("~{}", human_size(bytes)),
            (None, None) => String::new(),
        }
    }

    /// Average bitrate.
    pub fn bitrate(&self) -> String {
        self.tbr.map(|tbr| format!("{tbr:.0}k")).unwrap_or_default()
    }

    /// Cells in column order: format, extension, resolution, rate, size,
    /// bitrate.
    pub fn cells(&self) -> [String; 6] {
        [
            self.format_id.clone(),
            self.ext.clone(),
            self.resolution.clone().unwrap_or_default(),
            self.rate(),
            self.size(),
            self.bitrate(),
        ]
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[derive(Deserialize)]
struct RawInfo {
    title: String,
    webpage_url: String,
    #[serde(default)]
    live_status: Option<String>,
    #[serde(default)]
    age_limit: Option<u32>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<FormatRow>,
}

/// Information about one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Video title.
    pub title: String,
    /// Canonical page URL.
    pub url: String,
    /// Whether the video is a stream that is live right now.
    pub is_live: bool,
    /// Minimum viewer age, `0` when unrestricted.
    pub age_limit: u32,
    /// Length; zero for live streams.
    pub duration: Duration,
    /// Available formats, in extractor order.
    pub formats: Vec<FormatRow>,
}

impl VideoInfo {
    /// Parse the extractor's JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawInfo = serde_json::from_str(json)?;
        Ok(raw.into())
    }

    /// Whether the age limit hides the video from minors.
    pub fn is_age_restricted(&self) -> bool {
        self.age_limit >= AGE_RESTRICTED
    }

    /// Look up a format by id.
    pub fn format(&self, format_id: &str) -> Option<&FormatRow> {
        self.formats.iter().find(|row| row.format_id == format_id)
    }
}

impl From<RawInfo> for VideoInfo {
    fn from(raw: RawInfo) -> Self {
        let seconds = raw.duration.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0);
        Self {
            is_live: raw.live_status.as_deref() == Some(LIVE),
            title: raw.title,
            url: raw.webpage_url,
            age_limit: raw.age_limit.unwrap_or(0),
            duration: Duration::from_seconds(seconds.round() as u64),
            formats: raw.formats,
        }
    }
}

impl fmt::Display for VideoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}, duration: {}, live: {}, age restriction: ",
            self.title, self.url, self.duration, self.is_live
        )?;
        match self.age_limit {
            0 => f.write_str("none")?,
            limit => write!(f, "{limit}")?,
        }
        write!(f, ", {} formats", self.formats.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "title": "Rust in 100 Seconds",
        "webpage_url": "https://www.youtube.com/watch?v=5C_HPTJg5ek",
        "live_status": "not_live",
        "age_limit": 0,
        "duration": 3750.4,
        "uploader": "ignored",
        "formats": [
            {"format_id": "sb0", "ext": "mhtml", "resolution": "48x27", "fps": 0.5},
            {"format_id": "140", "ext": "m4a", "resolution": "audio only",
             "fps": null, "asr": 44100, "filesize": 2097152, "tbr": 129.6},
            {"format_id": "22", "ext": "mp4", "resolution": "1280x720",
             "fps": 30, "asr": 44100, "filesize_approx": 512, "tbr": 1043.2}
        ]
    }"#;

    #[test]
    fn test_duration_display() {
        assert_eq!(Duration::from_seconds(30).to_string(), "30");
        assert_eq!(Duration::from_seconds(68).to_string(), "1:08");
        assert_eq!(Duration::from_seconds(3750).to_string(), "1:02:30");
        assert_eq!(Duration::from_seconds(0).to_string(), "0");
        let d = Duration::from_seconds(3750);
        assert_eq!((d.hours, d.minutes, d.seconds), (1, 2, 30));
        assert_eq!(d.as_seconds(), 3750);
    }

    #[test]
    fn test_parse_document() {
        let info = VideoInfo::from_json(DOCUMENT).unwrap();
        assert_eq!(info.title, "Rust in 100 Seconds");
        assert_eq!(info.url, "https://www.youtube.com/watch?v=5C_HPTJg5ek");
        assert!(!info.is_live);
        assert!(!info.is_age_restricted());
        assert_eq!(info.duration.to_string(), "1:02:30");
        assert_eq!(info.formats.len(), 3);
        assert_eq!(info.format("sb0").map(|f| f.ext.as_str()), Some("mhtml"));
    }

    #[test]
    fn test_format_cells() {
        let info = VideoInfo::from_json(DOCUMENT).unwrap();
        let audio = info.format("140").unwrap();
        assert_eq!(
            audio.cells(),
            ["140", "m4a", "audio only", "44100 Hz", "2.00 MiB", "130k"].map(String::from)
        );
        let video = info.format("22").unwrap();
        assert_eq!(video.rate(), "30 fps");
        assert_eq!(video.size(), "~512 B");
    }

    #[test]
    fn test_live_and_age_limit() {
        let info = VideoInfo::from_json(
            r#"{"title": "t", "webpage_url": "u", "live_status": "is_live", "age_limit": 18}"#,
        )
        .unwrap();
        assert!(info.is_live);
        assert!(info.is_age_restricted());
        assert_eq!(info.duration, Duration::default());
        assert!(info.formats.is_empty());
        assert_eq!(info.to_string(), "t | u, duration: 0, live: true, age restriction: 18, 0 formats");
    }

    #[test]
    fn test_missing_title_is_error() {
        assert!(VideoInfo::from_json(r#"{"webpage_url": "u"}"#).is_err());
    }
}
