use std::str::FromStr;

use fern::colors::{Color, ColoredLevelConfig};

use crate::env::{get_env, EnvError};

#[derive(thiserror::Error, Debug)]
pub enum LoggerError {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("LOG_LEVEL {0:?} invalid")]
    Level(String),
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

/// `targets` are the crate names logged at `LOG_LEVEL`; everything else stays at WARN.
pub fn setup_logger(
    targets: &[&'static str],
    levels: Option<Vec<(String, log::LevelFilter)>>,
) -> Result<(), LoggerError> {
    let colors = ColoredLevelConfig {
        trace: Color::Cyan,
        debug: Color::Magenta,
        info: Color::Green,
        warn: Color::Red,
        error: Color::BrightRed,
    };

    let log_level_str = get_env("LOG_LEVEL", Some("INFO"))?;
    let log_level =
        log::LevelFilter::from_str(&log_level_str).map_err(|_| LoggerError::Level(log_level_str))?;

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}] {}",
                chrono::Local::now().format("[%H:%M:%S.%f]"),
                colors.color(record.level()),
                message
            ))
        })
        .chain(std::io::stdout())
        .level(log::LevelFilter::Warn);
    for target in targets {
        dispatch = dispatch.level_for(*target, log_level);
    }
    if let Some(current_bin) = current_bin_name() {
        dispatch = dispatch.level_for(current_bin, log_level);
    }
    if let Some(levels) = levels {
        for (module, level) in levels {
            dispatch = dispatch.level_for(module, level);
        }
    }

    dispatch.apply()?;
    Ok(())
}

fn current_bin_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_name()?
        .to_str()?
        .to_owned()
        .into()
}
