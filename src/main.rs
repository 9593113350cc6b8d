#[tokio::main]
async fn main() {
    if let Err(e) = animo::run().await {
        eprintln!("animo: {e}");
        std::process::exit(1);
    }
}
