use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use vigil_domain::Observation;
use vigil_ports::Probe;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// One GET against the provisioned application's URL per tick. The target
/// deployment serves a self-signed certificate, so validation is off.
pub struct HttpAvailability {
    url: String,
    client: reqwest::Client,
}

impl HttpAvailability {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl Probe for HttpAvailability {
    fn name(&self) -> &'static str {
        "HTTP availability"
    }

    async fn observe(&self) -> Observation {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || status.is_redirection() {
                    Observation::success(format!("GET {} {status}", self.url), "")
                } else {
                    Observation::failure("", format!("GET {} returned {status}", self.url))
                }
            }
            Err(err) => Observation::failure("", format!("GET {} failed: {err:#}", self.url)),
        }
    }
}
