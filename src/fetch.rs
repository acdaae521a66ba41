use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::config::SiteConfig;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("GET {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url}: unexpected status {status}")]
    Status { url: String, status: u16 },
}

pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<String, TransportError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(site: &SiteConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(site.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|err| anyhow::anyhow!("build http client: {err}"))?;

        Ok(Self {
            client,
            user_agent: site.user_agent.clone(),
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        tracing::debug!(%url, "GET");
        let request_error = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(request_error)
    }
}
