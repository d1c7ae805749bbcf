use std::process;

fn main() {
    if let Err(e) = client::run_client() {
        eprintln!("Error: {}.", e);
        process::exit(1);
    }
}
