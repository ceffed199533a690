use tracing::error;

mod app;
mod config;
mod domain;
mod infra;
mod logging;
mod platform;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use crate::app::App;
use crate::config::default_webview_data_dir;
use crate::logging::init_logging;

fn main() {
    init_logging();

    let webview_data_dir = match default_webview_data_dir() {
        Ok(dir) => dir,
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed to resolve webview data directory");
            std::process::exit(1);
        }
    };

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Maestro Workbench"))
                .with_data_directory(webview_data_dir),
        )
        .launch(App);
}
