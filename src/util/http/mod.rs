use std::{sync::Once, time::{Duration, Instant}};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use reqwest::{header, Client, Method, RequestBuilder, Response};

use crate::logging::Logger;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

static CRYPTO_PROVIDER: Once = Once::new();

/// reqwest 使用 rustls-no-provider，建立 client 前要先裝好 ring 的 provider
fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // 已經有其他地方裝過時會回傳 Err，不影響使用
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Builds the reqwest client shared by every upstream call of one run.
///
/// The client is created once at startup and handed to the crawlers, so the
/// connection pool is reused across polling cycles.
///
/// # Arguments
///
/// * `timeout`: The per-request timeout.
///
/// # Returns
///
/// * `Result<Client>`: The client, or an error if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<Client> {
    install_crypto_provider();

    Client::builder()
        // ===== 壓縮 =====
        .gzip(true)
        // ===== 超時設置 =====
        .connect_timeout(timeout)
        .timeout(timeout)
        // ===== 連接池 =====
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
}

/// Performs an HTTP GET request and returns the response body as text.
///
/// # Arguments
///
/// * `client`: The shared client.
/// * `url`: The URL to send the GET request to.
/// * `headers`: An optional set of headers to include with the request.
///
/// # Returns
///
/// * `Result<String>`: The response text, or an error if the request fails,
///   the status is not a success, or the body cannot be read.
pub async fn get(client: &Client, url: &str, headers: Option<header::HeaderMap>) -> Result<String> {
    send(client, Method::GET, url, headers, None::<fn(_) -> _>)
        .await?
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

/// Performs an HTTP POST request with a raw body and returns the response body as text.
///
/// The body is sent as given; callers choose the content type through `headers`.
///
/// # Arguments
///
/// * `client`: The shared client.
/// * `url`: The URL to send the POST request to.
/// * `headers`: An optional set of headers to include with the request.
/// * `body`: The request body.
///
/// # Returns
///
/// * `Result<String>`: The response text, or an error if the request fails,
///   the status is not a success, or the body cannot be read.
pub async fn post(
    client: &Client,
    url: &str,
    headers: Option<header::HeaderMap>,
    body: String,
) -> Result<String> {
    send(
        client,
        Method::POST,
        url,
        headers,
        Some(move |rb: RequestBuilder| rb.body(body)),
    )
    .await?
    .text()
    .await
    .map_err(|e| anyhow!("Error reading response body: {:?}", e))
}

/// Sends one HTTP request. There is no retry: a failed attempt is logged and
/// returned to the caller, which decides how the polling cycle carries on.
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    headers: Option<header::HeaderMap>,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let mut rb = client.request(method, url);

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    let start = Instant::now();
    let res = rb.send().await;
    let elapsed = start.elapsed().as_millis();

    match res {
        Ok(response) => {
            LOGGER.info(format!("{} {} {} ms", visit_log, response.status(), elapsed));
            response
                .error_for_status()
                .map_err(|why| anyhow!("{} returned an error status: {:?}", visit_log, why))
        }
        Err(why) => {
            LOGGER.error(format!("{} failed because {:?}. {} ms", visit_log, why, elapsed));
            Err(anyhow!("Failed to send request to {}: {:?}", url, why))
        }
    }
}
