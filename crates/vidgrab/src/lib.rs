//! vidgrab: look up an online video's metadata and download one of its
//! formats through yt-dlp.
//!
//! The application follows a model-view-presenter split:
//!
//! - [`model`]: the [`Model`] trait and [`YtDlp`], which runs the extractor
//!   and parses its JSON into [`VideoInfo`]
//! - [`view`]: [`MainWindow`], built from the composite widgets of
//!   `vidgrab-widgets`
//! - [`presenter`]: [`Presenter`], which wires button commands and tree
//!   signals to model calls
//!
//! Around them sit [`config`] (TOML settings), [`logging`] (tracing setup
//! plus the buffer behind the console window), [`error`] and [`cli`], the
//! headless run behind the `vidgrab` binary.
//!
//! # Example
//!
//! ```
//! use vidgrab::{Config, MainWindow, Presenter, YtDlp};
//! use vidgrab::model::SAMPLE_URL;
//! use vidgrab_widgets::Toolkit;
//!
//! let tk = Toolkit::new();
//! let config = Config::default();
//! let view = MainWindow::new(&tk, &config).unwrap();
//! let presenter = Presenter::new(YtDlp::from_config(&config), view, config, None).unwrap();
//!
//! presenter.view().set_url(SAMPLE_URL).unwrap();
//! presenter.get_video_info().unwrap();
//! assert_eq!(presenter.view().formats().children("").unwrap().len(), 8);
//! ```

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod model;
pub mod postprocess;
pub mod presenter;
pub mod status;
pub mod video;
pub mod view;

pub use config::Config;
pub use console::ConsoleWindow;
pub use error::{AppError, Result};
pub use logging::LogBuffer;
pub use model::{Model, YtDlp};
pub use presenter::Presenter;
pub use status::StatusBar;
pub use video::{FormatRow, VideoInfo};
pub use view::MainWindow;
