use ansi_term::Colour::Red;
use leetsync::{cmd, icon::Icon};

fn main() {
    env_logger::init();

    if let Err(e) = cmd::process() {
        eprintln!("{}", Red.paint(format!("{} Error: {}", Icon::No, e)));
        std::process::exit(1);
    }
}
