#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::Path;

use trace_oxide::constants::config::CONFIG_FILE;
use trace_oxide::DownsampleConfig;

mod app;
mod ui;

use app::TraceOxide;

#[cfg(feature = "profile-with-puffin")]
fn start_puffin_server() -> Option<puffin_http::Server> {
    puffin::set_scopes_on(true);
    let addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
    match puffin_http::Server::new(&addr) {
        Ok(server) => {
            log::info!("puffin server listening on {}", addr);
            Some(server)
        }
        Err(e) => {
            log::warn!("failed to start puffin server: {}", e);
            None
        }
    }
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(feature = "profile-with-puffin")]
    let _puffin_server = start_puffin_server();

    let config = DownsampleConfig::load_or_default(Path::new(CONFIG_FILE));
    log::info!(
        "point budget {} ({} px per column)",
        config.global_point_budget,
        config.min_points_per_pixel
    );

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "trace-oxide - State Trace Viewer",
        options,
        Box::new(move |_| Ok(Box::new(TraceOxide::new(config)))),
    )
}
