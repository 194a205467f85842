/*!
    Diagnostic logging setup.

    Logs always go to stderr. Stdout may be carrying records.
*/

use tracing_subscriber::EnvFilter;

/**
    Install the global subscriber.

    `RUST_LOG` wins when set; otherwise the level follows the number of
    `-v` flags, starting from warnings only.
*/
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
