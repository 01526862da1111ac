use std::env;
use std::io;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tuneshelf::config::Settings;
use tuneshelf::shell::Shell;

fn load_settings() -> Settings {
    match Settings::load() {
        Ok(s) => {
            if let Err(err) = s.validate() {
                eprintln!("tuneshelf: invalid config, using defaults: {err}");
                Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("tuneshelf: failed to load config, using defaults: {e}");
            Settings::default()
        }
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings();
    init_logging(&settings);

    let root = match env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => match &settings.library.root {
            Some(root) => root.clone(),
            None => env::current_dir()?,
        },
    };

    let mut shell = Shell::new(root, settings);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)?;
    Ok(())
}
