use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};

use crate::config::ScrapeConfig;
use crate::error::{Result, SwallowError};

/// Source of page text. The pipeline only talks to this seam.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;

    /// Pre-flight probe run once before any page is fetched.
    fn check_connectivity(&self) -> Result<()>;
}

pub struct HttpFetcher {
    client: Client,
    connectivity_url: String,
    connectivity_timeout: std::time::Duration,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(crate::config::USER_AGENT));
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .default_headers(headers)
            .build()
            .map_err(SwallowError::Client)?;

        Ok(HttpFetcher {
            client,
            connectivity_url: config.connectivity_url.clone(),
            connectivity_timeout: config.connectivity_timeout,
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let fetch_error = |e: reqwest::Error| SwallowError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self.client.get(url).send().map_err(fetch_error)?;
        let status = resp.status();
        if !status.is_success() {
            // Error pages still get scanned.
            warn!("{} answered with status {}", url, status);
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = resp.bytes().map_err(fetch_error)?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(decode_body(&body, content_type.as_deref()))
    }

    fn check_connectivity(&self) -> Result<()> {
        info!("Checking network connectivity...");
        let resp = self
            .client
            .get(&self.connectivity_url)
            .timeout(self.connectivity_timeout)
            .send()
            .map_err(|e| SwallowError::Connectivity(e.to_string()))?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(SwallowError::Connectivity(format!(
                "{} answered with status {}",
                self.connectivity_url,
                resp.status()
            )));
        }
        info!("Network connectivity OK");
        Ok(())
    }
}

/// Decodes with the declared charset when the server names a known one,
/// otherwise with the encoding guessed from the bytes.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(body, true);
            detector.guess(None, true)
        });

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!("Malformed {} sequences replaced while decoding", used.name());
    }
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=GBK").as_deref(),
            Some("GBK")
        );
        assert_eq!(
            charset_from_content_type("text/html;Charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn test_decode_declared_charset() {
        let (bytes, _, _) = encoding_rs::GBK.encode("联系邮箱: admin@school.edu.cn");
        let text = decode_body(&bytes, Some("text/html; charset=gbk"));
        assert_eq!(text, "联系邮箱: admin@school.edu.cn");
    }

    #[test]
    fn test_decode_detects_utf8() {
        let page = "<p>学号：2023010203，电话 13812345678</p>";
        assert_eq!(decode_body(page.as_bytes(), None), page);
    }

    #[test]
    fn test_unknown_charset_falls_back_to_detection() {
        let page = "plain ascii a@b.cn";
        assert_eq!(decode_body(page.as_bytes(), Some("text/html; charset=bogus")), page);
    }

    #[test]
    fn test_new_builds_client() {
        assert!(HttpFetcher::new(&ScrapeConfig::default()).is_ok());
    }
}
