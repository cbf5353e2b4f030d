use crate::{LeetSyncError, Result};
use log::debug;
use reqwest::{
    self,
    blocking::{Client, Response},
    header::HeaderMap,
};
use serde::Serialize;

/// Build a blocking client carrying `headers` on every request.
pub fn client(headers: HeaderMap) -> Result<Client> {
    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(LeetSyncError::Reqwest)
}

/// Make a POST request with a JSON body
pub fn post_json<T: Serialize + ?Sized>(
    url: &str,
    headers: HeaderMap,
    body: &T,
) -> Result<Response> {
    debug!("POST {}", url);
    client(headers)?
        .post(url)
        .json(body)
        .send()
        .map_err(LeetSyncError::Reqwest)
}

/// Turn a non-2xx response into `LeetSyncError::Http`.
pub fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(LeetSyncError::Http {
        service,
        status: status.as_u16(),
        body,
    })
}
