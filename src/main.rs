fn main() {
    if let Err(err) = demand_lens::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
