use anyhow::Result;
use gltf_preview_server::lsp::server::serve;

#[tokio::main]
async fn main() -> Result<()> {
    serve().await
}
