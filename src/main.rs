// Thin delegating binary.
//
// The actual server assembly lives in the extracted `ledgerlink-server` crate.
#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    ledgerlink_server::run().await
}
