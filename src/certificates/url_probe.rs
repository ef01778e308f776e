// URL Probe - Request a URL while presenting a certificate as client identity

use super::parser::LoadedCertificate;
use reqwest::{Client, Identity};
use std::time::Duration;

/// Issues one GET per probe and reports the outcome as text
#[derive(Debug, Clone)]
pub struct UrlProbe {
    timeout: Duration,
}

impl UrlProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// GET `url`, returning `HTTP <status>` or `Request failed: <detail>`
    ///
    /// The certificate is presented as the TLS client identity only when its
    /// private key is held.
    pub async fn probe(&self, url: &str, certificate: &LoadedCertificate) -> String {
        let client = match self.client_for(certificate) {
            Ok(client) => client,
            Err(e) => return format!("Request failed: {}", e),
        };

        match client.get(url).send().await {
            Ok(response) => format!("HTTP {}", response.status()),
            Err(e) => format!("Request failed: {}", e),
        }
    }

    fn client_for(&self, certificate: &LoadedCertificate) -> anyhow::Result<Client> {
        let mut builder = Client::builder().timeout(self.timeout);

        if let Some(key) = certificate.private_key() {
            let mut pem = key.private_key_to_pem_pkcs8()?;
            pem.extend(certificate.certificate().to_pem()?);
            for intermediate in certificate.bundled_ca() {
                pem.extend(intermediate.to_pem()?);
            }
            builder = builder.identity(Identity::from_pem(&pem)?);
        }

        Ok(builder.build()?)
    }
}
