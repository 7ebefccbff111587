use rejacl::Interp;
use std::env;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() {
    // Log to stderr, filtered by RUST_LOG; warnings only by default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    // FIRST, get the command line arguments.
    let args: Vec<String> = env::args().collect();

    // NEXT, create and initialize the interpreter.
    let interp = Interp::new();
    debug!(version = env!("CARGO_PKG_VERSION"), "rejaclsh starting");

    // NEXT, if there's at least one then it's a command file.
    if args.len() > 1 {
        rejacl_shell::script(&interp, &args[1..]);
    } else {
        rejacl_shell::repl(&interp);
    }

    interp.dispose();
}
