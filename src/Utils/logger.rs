use chrono::Local;
use csv::Writer;
use ndarray::{ArrayBase, Data, Ix2};
use simplelog::*;
use std::fmt::Display;
use std::fs::File;
use std::io;

/// map loglevel names used across the crate onto simplelog filters
pub fn parse_loglevel(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" | "none" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// Install a terminal logger, plus a file logger `log_<date>.txt` when `log_to_file` is set.
/// Returns false when logging is switched off or another logger was installed first;
/// the latter is harmless, records go to the existing logger.
pub fn init_logger(loglevel: Option<&str>, log_to_file: bool) -> bool {
    let log_option = loglevel
        .and_then(parse_loglevel)
        .unwrap_or(LevelFilter::Info);
    if log_option == LevelFilter::Off {
        return false;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        match File::create(&name) {
            Ok(file) => loggers.push(WriteLogger::new(log_option, Config::default(), file)),
            Err(e) => eprintln!("cannot create log file {}: {}", name, e),
        }
    }
    CombinedLogger::init(loggers).is_ok()
}

/// Save a jacobian in (n, m) orientation: one row per input variable, one column per function.
pub fn save_jacobian_to_csv<A, S>(jac: &ArrayBase<S, Ix2>, filename: &str) -> io::Result<()>
where
    A: Display,
    S: Data<Elem = A>,
{
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    let mut headers = vec!["x".to_string()];
    headers.extend((0..jac.ncols()).map(|j| format!("df{}", j)));
    writer.write_record(&headers)?;

    for (i, row) in jac.rows().into_iter().enumerate() {
        let mut row_data = vec![format!("x{}", i)];
        row_data.extend(row.iter().map(|val| val.to_string()));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    Ok(())
}
