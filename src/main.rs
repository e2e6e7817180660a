use anyhow::Context;
use log::{error, info};
use xcb_opengl::platform::GlxPlatform;
use xcb_opengl::{exit_code, App, AppConfig, AppError};

fn run() -> anyhow::Result<()> {
    let platform = match GlxPlatform::open() {
        Ok(platform) => platform,
        Err(e) => {
            info!("Exiting.");
            return Err(anyhow::Error::new(e).context("Initialization failed!"));
        }
    };

    let mut app = App::new(platform, AppConfig::default());
    let result = app.run();
    app.teardown();

    result.context("xcb-opengl stopped")
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = run();
    if let Err(e) = &result {
        let logged = e.downcast_ref::<AppError>().map_or(false, AppError::is_logged);
        if !logged {
            error!("{:#}", e);
        }
    }

    std::process::exit(exit_code(&result));
}
