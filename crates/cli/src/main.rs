//! The `discogen` command-line binary.

fn main() {
    discogen_cli::init_tracing();
    let code = discogen_cli::run(std::env::args().collect());
    std::process::exit(code);
}
