mod audio;
mod config;
mod controller;
mod library;
mod runtime;
mod session;
mod store;

fn main() -> anyhow::Result<()> {
    let loaded = runtime::load_settings();
    let settings = loaded.clone().unwrap_or_default();

    let mut clog = colog::default_builder();
    clog.filter(None, settings.log.level_filter());
    clog.parse_default_env();
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    if let Err(msg) = &loaded {
        log::warn!("{msg}");
    }

    runtime::run(settings)
}
