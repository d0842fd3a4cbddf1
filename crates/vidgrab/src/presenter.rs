//! The presenter: sequences user actions between the view and the model.
//!
//! Buttons and the formats tree call back into the presenter through weak
//! references, so the widget tree never keeps it alive. Failures that are
//! not widget errors end up as transient messages in the status bar.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use vidgrab_core::{Args, Slot};
use vidgrab_widgets::widget::TreeListParts;
use vidgrab_widgets::{BusyGuard, ItemClick, StateFlags, StateGuard, Stateful, TreeListSignal};

use crate::config::Config;
use crate::console::ConsoleWindow;
use crate::error::{AppError, Result};
use crate::logging::{LogBuffer, targets};
use crate::model::Model;
use crate::view::MainWindow;

/// Mediates between a [`Model`] and the [`MainWindow`].
pub struct Presenter<M: Model> {
    model: RefCell<M>,
    view: MainWindow,
    config: Config,
    console: RefCell<Option<ConsoleWindow>>,
    log: Option<LogBuffer>,
}

impl<M: Model + 'static> Presenter<M> {
    /// Take over `view` and wire its actions.
    ///
    /// `log` is drained into the console window whenever it is shown and
    /// after every action.
    pub fn new(model: M, view: MainWindow, config: Config, log: Option<LogBuffer>) -> Result<Rc<Self>> {
        let presenter = Rc::new(Self {
            model: RefCell::new(model),
            view,
            config,
            console: RefCell::new(None),
            log,
        });
        presenter.connect()?;
        Ok(presenter)
    }

    fn connect(self: &Rc<Self>) -> Result<()> {
        let weak = Rc::downgrade(self);
        let view = &self.view;
        view.fetch_button().set_command(command(&weak, Self::get_video_info))?;
        view.download_button().set_command(command(&weak, Self::download_video))?;
        view.console_button().set_command(command(&weak, Self::show_console))?;

        let slot: Slot<RefCell<TreeListParts>> = Rc::new(move |_parts: &Rc<RefCell<TreeListParts>>, args: &Args| {
            let Some(presenter) = weak.upgrade() else {
                return Ok(());
            };
            presenter
                .select_clicked_format(&ItemClick::from_args(args))
                .or_else(|err| presenter.report(err))
        });
        view.formats()
            .signal(TreeListSignal::ItemDoubleClicked)
            .connect(slot, Args::new());
        Ok(())
    }

    /// Fetch info for the URL in the entry and show it.
    ///
    /// The window is busy and the fetch button disabled while the model
    /// works. Extractor failures clear the view and flash the error.
    pub fn get_video_info(&self) -> Result<()> {
        let url = self.view.url()?;
        let status = self.view.status();
        if url.is_empty() {
            status.flash("Enter a URL first")?;
            return Ok(());
        }

        tracing::info!(target: targets::PRESENTER, %url, "fetching video info");
        status.show(&format!("Fetching {url}"))?;
        let fetched = {
            let _busy = BusyGuard::hold(self.view.root())?;
            let mut button = self.view.fetch_button().clone();
            let mut disabled = button.state()?;
            disabled.insert(StateFlags::DISABLED);
            let _disabled = StateGuard::new(&mut button, disabled)?;
            self.model.borrow_mut().video_info(&url).cloned()
        };

        match fetched {
            Ok(info) => {
                self.view.update_video_info(&info)?;
                self.view.set_download_enabled(true)?;
                status.show(&format!(
                    "Fetched \"{}\" ({} formats)",
                    info.title,
                    info.formats.len()
                ))?;
            }
            Err(err @ AppError::Widget(_)) => return Err(err),
            Err(err) => {
                tracing::warn!(target: targets::PRESENTER, %url, error = %err, "fetch failed");
                self.view.clear_video_info()?;
                self.view.set_download_enabled(false)?;
                status.flash(&format!("Error: {err}"))?;
            }
        }
        self.pump_log()
    }

    /// Download the fetched video in the selected format.
    ///
    /// Uses the selector entry, or the configured default format when it
    /// is empty. Fails with [`AppError::NoVideoInfo`] before a fetch.
    pub fn download_video(&self) -> Result<()> {
        let Some(url) = self.model.borrow().current().map(|info| info.url.clone()) else {
            return Err(AppError::NoVideoInfo);
        };
        let selector = self.view.format_selector()?;
        let format = if selector.is_empty() {
            self.config.default_format.clone()
        } else {
            selector
        };

        tracing::info!(target: targets::PRESENTER, %url, %format, "downloading");
        let status = self.view.status();
        status.show(&format!("Downloading format {format}"))?;
        let mut progress_error = None;
        let downloaded = {
            let _busy = BusyGuard::hold(self.view.root())?;
            let mut progress = |line: &str| {
                if let Err(err) = status.show(line) {
                    progress_error.get_or_insert(err);
                }
            };
            self.model.borrow_mut().download(&url, &format, &mut progress)
        };
        if let Some(err) = progress_error {
            return Err(err.into());
        }

        match downloaded? {
            Some(path) => status.show(&format!("Downloaded {}", path.display()))?,
            None => status.show("Download finished")?,
        }
        self.pump_log()
    }

    /// Copy the format id of a double-clicked row into the selector.
    ///
    /// Only clicks on data cells count; headings, separators and empty
    /// space are ignored.
    pub fn select_clicked_format(&self, click: &ItemClick) -> Result<()> {
        let on_data_column = click.column_index().is_some_and(|index| index > 0);
        if !click.is_cell() || !on_data_column || click.row.is_empty() {
            return Ok(());
        }
        let values = self.view.formats().item_values(&click.row)?;
        let Some(format_id) = values.first().map(ToString::to_string) else {
            return Ok(());
        };
        tracing::debug!(target: targets::PRESENTER, %format_id, row = %click.row, "format selected");
        self.view.set_format_selector(&format_id)?;
        self.view.status().flash(&format!("Selected format {format_id}"))?;
        Ok(())
    }

    /// Open the console window, or bring it back if it was closed.
    pub fn show_console(&self) -> Result<()> {
        {
            let mut console = self.console.borrow_mut();
            if let Some(window) = console.as_ref() {
                window.show()?;
            } else {
                let toolkit = self.view.root().toolkit();
                *console = Some(ConsoleWindow::new(toolkit, &self.config.text)?);
            }
        }
        self.pump_log()
    }

    /// Move buffered log lines into the console window, if it exists.
    pub fn pump_log(&self) -> Result<()> {
        let Some(buffer) = &self.log else {
            return Ok(());
        };
        if let Some(console) = self.console.borrow_mut().as_mut() {
            console.sync(buffer)?;
        }
        Ok(())
    }

    /// Show a failed action in the status bar; widget errors propagate.
    pub fn report(&self, err: AppError) -> vidgrab_core::Result<()> {
        match err {
            AppError::Widget(err) => Err(err),
            err => {
                tracing::warn!(target: targets::PRESENTER, error = %err, "action failed");
                self.view.status().flash(&format!("Error: {err}"))
            }
        }
    }

    /// The main window.
    pub fn view(&self) -> &MainWindow {
        &self.view
    }

    /// The model.
    pub fn model(&self) -> Ref<'_, M> {
        self.model.borrow()
    }

    /// The console window, once opened.
    pub fn console(&self) -> Ref<'_, Option<ConsoleWindow>> {
        self.console.borrow()
    }
}

/// Button command running `action` on the presenter, if it still exists.
fn command<M: Model + 'static>(
    presenter: &Weak<Presenter<M>>,
    action: fn(&Presenter<M>) -> Result<()>,
) -> impl Fn() -> vidgrab_core::Result<()> + 'static {
    let presenter = presenter.clone();
    move || match presenter.upgrade() {
        Some(presenter) => action(&presenter).or_else(|err| presenter.report(err)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use vidgrab_widgets::toolkit::{HEADING_HEIGHT, ROW_HEIGHT};
    use vidgrab_widgets::{Toolkit, Widget};

    use super::*;
    use crate::model::sample_video_info;
    use crate::video::VideoInfo;
    use crate::view::InfoField;

    /// Answers every fetch with the sample, or with `failure` when set.
    struct MockModel {
        info: Option<VideoInfo>,
        failure: Option<String>,
        fetches: usize,
        downloads: Vec<(String, String)>,
        probe: Option<(Widget, Widget)>,
        seen_busy: bool,
        seen_disabled: bool,
    }

    impl MockModel {
        fn new() -> Self {
            Self {
                info: None,
                failure: None,
                fetches: 0,
                downloads: Vec::new(),
                probe: None,
                seen_busy: false,
                seen_disabled: false,
            }
        }
    }

    impl Model for MockModel {
        fn video_info(&mut self, _url: &str) -> Result<&VideoInfo> {
            self.fetches += 1;
            if let Some((root, button)) = &self.probe {
                self.seen_busy = root.toolkit().busy_status(root.id())?;
                self.seen_disabled = button.instate("disabled")?;
            }
            self.info = None;
            if let Some(message) = &self.failure {
                return Err(AppError::Extractor(message.clone()));
            }
            Ok(self.info.insert(sample_video_info()?))
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
            self.downloads.push((url.to_string(), format.to_string()));
            progress("[download] 100% of 3.29MiB");
            Ok(Some(PathBuf::from("/videos/clip.mp4")))
        }
    }

    fn presenter(tk: &Toolkit, model: MockModel) -> Rc<Presenter<MockModel>> {
        let config = Config {
            status_timeout_ms: 100,
            ..Config::default()
        };
        let view = MainWindow::new(tk, &config).unwrap();
        Presenter::new(model, view, config, Some(LogBuffer::new(32))).unwrap()
    }

    #[test]
    fn test_fetch_fills_view() {
        let tk = Toolkit::new();
        let presenter = presenter(&tk, MockModel::new());
        let view = presenter.view();
        view.set_url("zipped").unwrap();

        assert!(view.fetch_button().invoke().unwrap());

        let info = sample_video_info().unwrap();
        assert_eq!(view.field(InfoField::Title).unwrap(), info.title);
        assert_eq!(view.formats().children("").unwrap().len(), info.formats.len());
        assert!(view.download_button().instate("!disabled").unwrap());
        assert!(view.status().text().unwrap().starts_with("Fetched \"Rick Astley"));
    }

    #[test]
    fn test_fetch_holds_window_busy_and_button_disabled() {
        let tk = Toolkit::new();
        let view = MainWindow::new(&tk, &Config::default()).unwrap();
        let mut model = MockModel::new();
        model.probe = Some((view.root().clone(), view.fetch_button().clone()));
        let presenter = Presenter::new(model, view, Config::default(), None).unwrap();
        presenter.view().set_url("zipped").unwrap();

        presenter.get_video_info().unwrap();

        assert!(presenter.model().seen_busy);
        assert!(presenter.model().seen_disabled);
        assert!(!tk.busy_status(tk.root().id()).unwrap());
        assert!(presenter.view().fetch_button().instate("!disabled").unwrap());
    }

    #[test]
    fn test_fetch_failure_flashes_error() {
        let tk = Toolkit::new();
        let mut model = MockModel::new();
        model.failure = Some("Unsupported URL".into());
        let presenter = presenter(&tk, model);
        let view = presenter.view();
        view.set_url("https://example.com").unwrap();

        assert!(view.fetch_button().invoke().unwrap());
        assert_eq!(view.status().text().unwrap(), "Error: extractor failed: Unsupported URL");
        assert!(view.download_button().instate("disabled").unwrap());
        assert!(view.formats().children("").unwrap().is_empty());

        tk.advance(Duration::from_millis(100));
        assert_eq!(view.status().text().unwrap(), "");
    }

    #[test]
    fn test_empty_url_is_not_fetched() {
        let tk = Toolkit::new();
        let presenter = presenter(&tk, MockModel::new());
        presenter.get_video_info().unwrap();
        assert_eq!(presenter.model().fetches, 0);
        assert_eq!(presenter.view().status().text().unwrap(), "Enter a URL first");
    }

    #[test]
    fn test_download_refused_before_fetch() {
        let tk = Toolkit::new();
        let presenter = presenter(&tk, MockModel::new());
        assert!(matches!(presenter.download_video(), Err(AppError::NoVideoInfo)));
        assert!(!presenter.view().download_button().invoke().unwrap());
        assert!(presenter.model().downloads.is_empty());
    }

    #[test]
    fn test_download_uses_selector_or_default() {
        let tk = Toolkit::new();
        let presenter = presenter(&tk, MockModel::new());
        let view = presenter.view();
        view.set_url("zipped").unwrap();
        view.fetch_button().invoke().unwrap();

        assert!(view.download_button().invoke().unwrap());
        view.set_format_selector(" 140 ").unwrap();
        assert!(view.download_button().invoke().unwrap());

        let url = sample_video_info().unwrap().url;
        assert_eq!(
            presenter.model().downloads,
            vec![(url.clone(), "best".to_string()), (url, "140".to_string())]
        );
        assert_eq!(view.status().text().unwrap(), "Downloaded /videos/clip.mp4");
    }

    #[test]
    fn test_double_click_selects_format() {
        let tk = Toolkit::new();
        let presenter = presenter(&tk, MockModel::new());
        let view = presenter.view();
        view.set_url("zipped").unwrap();
        view.fetch_button().invoke().unwrap();

        let second_row = HEADING_HEIGHT + ROW_HEIGHT + ROW_HEIGHT / 2;
        assert!(view.formats().double_click(250, second_row).unwrap());
        assert_eq!(view.format_selector().unwrap(), "139");
        assert_eq!(view.status().text().unwrap(), "Selected format 139");

        view.formats().double_click(10, HEADING_HEIGHT / 2).unwrap();
        assert_eq!(view.format_selector().unwrap(), "139");
    }

    #[test]
    fn test_console_receives_log() {
        let tk = Toolkit::new();
        let buffer = LogBuffer::new(32);
        let config = Config::default();
        let view = MainWindow::new(&tk, &config).unwrap();
        let presenter = Presenter::new(MockModel::new(), view, config, Some(buffer.clone())).unwrap();

        buffer.push_line(" INFO vidgrab: started");
        assert!(presenter.view().console_button().invoke().unwrap());
        {
            let console = presenter.console();
            let console = console.as_ref().unwrap();
            assert!(console.is_visible());
            assert_eq!(console.contents().unwrap(), " INFO vidgrab: started\n");
            console.close().unwrap();
        }

        buffer.push_line(" INFO vidgrab: again");
        presenter.show_console().unwrap();
        let console = presenter.console();
        let console = console.as_ref().unwrap();
        assert!(console.is_visible());
        assert_eq!(console.output().line_count().unwrap(), 2);
    }

    #[test]
    fn test_presenter_dropped_commands_are_inert() {
        let tk = Toolkit::new();
        let presenter = presenter(&tk, MockModel::new());
        let button = presenter.view().fetch_button().clone();
        drop(presenter);
        assert!(button.invoke().unwrap());
    }
}
