use rustyhead::config::{self, ServerConfig};
use rustyhead::net::server::Server;

fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(&path),
        None => ServerConfig::default(),
    };
    config::set_config(config);

    let server = Server::init().map_err(std::io::Error::other)?;
    async_std::task::block_on(server.run())
}
