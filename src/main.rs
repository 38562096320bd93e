fn main() {
    if let Err(err) = flowlane::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
