//! Logging façade: a thin wrapper over `log` + `log4rs` so adapters and the
//! CLI share one programmatic configuration instead of hand-rolling
//! `eprintln!`.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";

/// Installs a console logger at `info` level. Best-effort: if a logger is
/// already installed (e.g. by a test harness) this silently does nothing.
pub fn init_console() {
    let encoder = Box::new(PatternEncoder::new(PATTERN));
    let appender = ConsoleAppender::builder().encoder(encoder).build();
    let Ok(config) = Config::builder()
        .appender(Appender::builder().build("console", Box::new(appender)))
        .build(Root::builder().appender("console").build(LevelFilter::Info))
    else {
        return;
    };
    let _ = log4rs::init_config(config);
}

/// Initializes logging from a `log4rs.yaml`-style file at `path`. Falls
/// back silently to whatever logger (if any) is already installed.
pub fn init_file(path: &std::path::Path) {
    let _ = log4rs::init_file(path, log4rs::config::Deserializers::default());
}
