#[tokio::main]
async fn main() {
    if let Err(e) = media_shelf_lib::run().await {
        eprintln!("media-shelf: {:#}", e);
        std::process::exit(1);
    }
}
