use std::path::Path;

use lustre::options::Options;
use lustre::Viewer;

fn main() {
    env_logger::init();

    let mut builder = Viewer::builder();

    // Optional argument: path to a TOML options preset.
    if let Some(path) = std::env::args().nth(1) {
        match Options::load(Path::new(&path)) {
            Ok(options) => {
                log::info!("loaded options preset '{path}'");
                builder = builder.with_options(options);
            }
            Err(e) => {
                log::error!("failed to load options '{path}': {e}");
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = builder.build().run() {
        log::error!("viewer error: {e}");
        std::process::exit(1);
    }
}
