//! Reading application settings through named constants.
//!
//! Run with: cargo run --example settings

use semidoc::{constants, Config, Format};
use std::error::Error;

constants! {
    enum Setting {
        ServerHost = "SERVER_HOST",
        ServerPort = "SERVER_PORT",
        ServerWorkers = "SERVER_WORKERS",
        LogLevel = "LOG_LEVEL",
        FeatureFlags = "FEATURE_FLAGS",
    }
}

constants! {
    enum Level {
        Error = "ERROR",
        Warn = "WARN",
        Info = "INFO",
        Debug = "DEBUG",
    }
}

const PROPERTIES: &str = "\
# service settings
server.host = 0.0.0.0
server.port = 8080
log.level   = info
feature.flags[0] = search
feature.flags[1] = export
";

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load(Format::Properties, PROPERTIES.as_bytes())?;

    let host: String = config.setting(Setting::ServerHost)?;
    let port: u16 = config.setting(Setting::ServerPort)?;
    let workers: u32 = config.setting_or(Setting::ServerWorkers, 4)?;
    let level: Level = config.setting(Setting::LogLevel)?;
    let flags: Vec<Option<String>> = config.settings(Setting::FeatureFlags)?;

    println!("listening on {host}:{port} with {workers} workers");
    println!("log level {level:?}");
    println!("features {flags:?}");

    if level == Level::Debug || level == Level::Error {
        println!("unusual log level");
    }
    println!("warn enabled: {}", matches!(level, Level::Warn | Level::Info | Level::Debug));

    Ok(())
}
