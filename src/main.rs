use tactus::repl::Repl;

fn main() {
    let mut repl = match Repl::new() {
        Ok(repl) => repl,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = repl.run() {
        eprintln!("REPL error: {}", e);
        std::process::exit(1);
    }
}
