use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{info, warn};

use claims_terminal::backend::Backend;
use claims_terminal::ui::{LineSource, Renderer, StateController, StdinLineSource};

fn main() -> Result<()> {
    // Logs go to stderr; the prompt stream owns stdout.
    env_logger::init();
    info!("Starting claims terminal");

    let data_directory = data_directory()?;
    let backend = Backend::new(&data_directory)?;

    let config = backend.config_repository.load().unwrap_or_else(|e| {
        warn!("Could not read terminal config, using defaults: {}", e);
        Default::default()
    });
    let renderer = Renderer::new(config.show_menu_hints);

    let mut controller = StateController::new(backend);
    let mut input = StdinLineSource::new();
    let mut state = StateController::initial_state();

    loop {
        print!("{}", renderer.render(&state));
        io::stdout().flush()?;
        if state.is_terminal() {
            break;
        }
        let line = input.read_line();
        state = controller.next_state(state, &line);
    }

    info!("Session ended");
    Ok(())
}

/// First CLI argument, or the platform data directory.
fn data_directory() -> Result<PathBuf> {
    if let Some(path) = env::args().nth(1) {
        return Ok(PathBuf::from(path));
    }
    let dirs = ProjectDirs::from("", "", "claims-terminal")
        .context("Could not resolve a data directory; pass one as the first argument")?;
    Ok(dirs.data_dir().to_path_buf())
}
