//! rlens binary entry point.

fn main() {
    if let Err(err) = repolens::cli::run() {
        repolens::ui::output::error(format!("{err:#}"));
        std::process::exit(1);
    }
}
