use super::buffer::{EntropyError, EntropySource};
use std::io;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.random.org";

/// The service hands out at most this many integers per request.
const MAX_INTEGERS: usize = 10_000;

/// Fetches a URL and returns the body as text.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, EntropyError>;
}

/// Blocking HTTP over ureq.
#[derive(Debug, Default, Clone, Copy)]
pub struct UreqTransport;

fn is_timeout(err: &ureq::Transport) -> bool {
    std::error::Error::source(err)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .map_or(false, |err| {
            matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
        })
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, EntropyError> {
        match ureq::get(url).timeout(timeout).call() {
            Ok(response) => response
                .into_string()
                .map_err(|err| EntropyError::Unavailable(err.to_string())),
            Err(ureq::Error::Status(code, _)) => {
                Err(EntropyError::Unavailable(format!("status {}", code)))
            }
            Err(ureq::Error::Transport(err)) if is_timeout(&err) => Err(EntropyError::Timeout),
            Err(ureq::Error::Transport(err)) => Err(EntropyError::Unavailable(err.to_string())),
        }
    }
}

/// True random values from random.org's plain-text integer generator.
///
/// The service only deals in integers up to 10^9, so every `u32` is built
/// from two 16-bit halves.
#[derive(Debug, Clone)]
pub struct RandomOrgSource<T = UreqTransport> {
    base_url: String,
    transport: T,
}

impl RandomOrgSource {
    pub fn new() -> Self {
        Self::with_transport(UreqTransport)
    }
}

impl Default for RandomOrgSource {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> RandomOrgSource<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            transport,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The request for `count` values; asks for two halves per value.
    pub fn request_url(&self, count: usize) -> String {
        let halves = (count * 2).min(MAX_INTEGERS);
        format!(
            "{}/integers/?num={}&min=0&max=65535&col=1&base=10&format=plain&rnd=new",
            self.base_url.trim_end_matches('/'),
            halves
        )
    }
}

/// Joins consecutive 16-bit halves from a one-per-line body.
fn parse_body(body: &str) -> Result<Vec<u32>, EntropyError> {
    let halves = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.parse::<u16>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| EntropyError::Unavailable(format!("malformed response: {}", err)))?;

    Ok(halves
        .chunks_exact(2)
        .map(|pair| ((pair[0] as u32) << 16) | pair[1] as u32)
        .collect())
}

impl<T: Transport> EntropySource for RandomOrgSource<T> {
    fn fetch(&self, count: usize, timeout: Duration) -> Result<Vec<u32>, EntropyError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let body = self.transport.get(&self.request_url(count), timeout)?;
        parse_body(&body)
    }
}
