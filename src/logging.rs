use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}";

/// Initialise logging from `log4rs.yml` when present, otherwise to the console at info
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(LOG_CONFIG_FILE);
    if path.exists() {
        log4rs::init_file(path, Default::default())?;
        return Ok(());
    }

    log4rs::init_config(console_config(LevelFilter::Info)?)?;
    Ok(())
}

fn console_config(level: LevelFilter) -> Result<Config, Box<dyn std::error::Error>> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    Ok(config)
}
