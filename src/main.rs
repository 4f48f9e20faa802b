fn main() {
    if let Err(err) = jungle_viewer::run() {
        eprintln!("Application error: {err}");
        std::process::exit(1);
    }
}
