use imager_ledger::app;

fn main() {
    app::init_tracing();
    if let Err(e) = app::run(std::env::args()) {
        tracing::error!(error = %e, "imager-ledger failed");
        std::process::exit(1);
    }
}
