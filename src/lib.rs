pub mod app;
pub mod asset;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;

use app::App;
use error::ViewerError;
use settings::RenderSettings;
use winit::event_loop::EventLoop;

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

pub fn run() -> Result<(), ViewerError> {
    init_logging();

    log::info!("Starting jungle viewer");

    let settings = RenderSettings::load();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);

    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Application error: {}", err);
        return Err(err.into());
    }

    log::info!("Application shutdown complete");

    app.into_result()
}
