//! Command-line entry point (native).

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Starting BadgeInk");

    badgeink_app::cli::run()
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
