/// Configures `env_logger`; `RUST_LOG` takes precedence over the verbosity flag.
pub fn init_logger(verbose: bool) {
    let level = if verbose { log::LevelFilter::Trace } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}
