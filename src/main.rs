#![allow(clippy::uninlined_format_args)]

mod catalog;
mod console;
mod core;
mod devices;
mod errors;
mod options;
mod plate_solve;
mod sky_math;
mod utils;

use std::path::Path;

use crate::{
    options::Options,
    utils::{io_utils::*, log_utils},
};

fn panic_handler(
    panic_info:        &std::panic::PanicHookInfo,
    logs_dir:          &Path,
    def_panic_handler: &Box<dyn Fn(&std::panic::PanicHookInfo<'_>) + 'static + Sync + Send>,
) {
    let payload_str =
        if let Some(msg) = panic_info.payload().downcast_ref::<&'static str>() {
            Some(*msg)
        } else if let Some(msg) = panic_info.payload().downcast_ref::<String>() {
            Some(msg.as_str())
        } else {
            None
        };

    log::error!("PANIC OCCURRED");

    if let Some(payload) = &payload_str {
        log::error!("Panic payload: {}", payload);
    }

    if let Some(loc) = panic_info.location() {
        log::error!("Panic location: {}", loc);
    }

    log::error!(
        "Panic stacktrace: {}",
        std::backtrace::Backtrace::force_capture()
    );

    eprintln!(
        "{} crashed, look for logs at {}",
        env!("CARGO_PKG_NAME"),
        logs_dir.display()
    );

    def_panic_handler(panic_info);
}

fn main() -> anyhow::Result<()> {
    let mut logs_dir = get_app_dir()?;
    logs_dir.push("logs");
    log_utils::cleanup_old_logs(&logs_dir, 14/*days*/);
    log_utils::start_logger(&logs_dir)?;
    log::set_max_level(log::LevelFilter::Info);

    #[cfg(debug_assertions)] {
        unsafe { std::env::set_var("RUST_BACKTRACE", "1"); }
    }

    log::info!(
        "{} {} ver. {} is started",
        env!("CARGO_PKG_NAME"),
        std::env::consts::ARCH,
        env!("CARGO_PKG_VERSION")
    );

    std::panic::set_hook({
        let logs_dir = logs_dir.clone();
        let default_panic_handler = std::panic::take_hook();
        Box::new(move |panic_info| {
            panic_handler(panic_info, &logs_dir, &default_panic_handler)
        })
    });

    let mut options = Options::default();
    load_json_from_config_file(&mut options, "options")?;
    options.check()?;

    let mut console = console::Console::new(&options);
    console.run()?;

    log::info!("Exited from console loop");
    save_json_to_config(&options, "options")?;
    log::info!("Options saved");

    Ok(())
}
