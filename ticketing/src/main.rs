fn main() {
    if let Err(e) = ticketing::run_cli() {
        eprintln!("{e:?}");
        std::process::exit(1);
    }
}
