fn main() {
    if let Err(e) = companion_chat::run() {
        eprintln!("error while running companion chat: {}", e);
        std::process::exit(1);
    }
}
