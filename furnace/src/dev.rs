use std::path::PathBuf;
use std::thread;

use kiln::error::{Chainable, Result};
use kiln::{error, BuildMode, Config, Ctx, Pipeline};
use tokio::sync::broadcast;

use crate::server::DevServer;

/// Builds for development, then serves the output while a separate thread
/// rebuilds on change and tells connected pages to reload. Returns once the
/// server shuts down.
pub fn run(root: PathBuf, config: Config) -> Result<()> {
    let pipeline = Pipeline::default();
    if let Err(e) = pipeline.build(&Ctx::new(&root, &config, BuildMode::Development)) {
        tracing::error!("initial build failed:\n{e}");
    }

    let (reload, _) = broadcast::channel(16);
    let roots = vec![root.join(&config.paths.dist), root.join(&config.paths.views.output)];
    let server = DevServer::new(roots, reload.clone());
    let addr = format!("{}:{}", config.server.host, config.server.port);

    thread::Builder::new()
        .name("watch".into())
        .spawn(move || {
            let ctx = Ctx::new(&root, &config, BuildMode::Development);
            let result = kiln::watch::watch(&pipeline, &ctx, || {
                let clients = reload.send(()).unwrap_or(0);
                tracing::info!("reloading {clients} page(s)");
            });

            if let Err(e) = result {
                tracing::error!("watching stopped:\n{e}");
            }
        })
        .chain_with(|| error!("failed to start the watch thread"))?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .chain_with(|| error!("failed to start the async runtime"))?
        .block_on(server.serve(addr))
}
