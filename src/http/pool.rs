use reqwest::Client;
use std::time::Duration;
use crate::config::ClientConfig;
use crate::error::Result;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const POOL_MAX_IDLE_PER_HOST: usize = 10;

pub fn create_http_client(config: &ClientConfig) -> Result<Client> {
    let client = Client::builder()
        .tcp_nodelay(true) // Disable Nagle's algorithm for lower latency
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout())
        .build()?;

    Ok(client)
}
