use crate::error::NetflixError;
use crate::http::{HttpRequest, HttpTransport};
use crate::traits::ActivitySource;
use async_trait::async_trait;
use scraper::{Html, Selector};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info};
use traktflix_config::NetflixConfig;

/// Reads the viewing activity page of one Netflix profile.
pub struct NetflixClient {
    transport: Arc<dyn HttpTransport>,
    activity_url: String,
    cookie: SecretString,
}

impl NetflixClient {
    pub fn new(config: &NetflixConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            activity_url: join_url(&config.url, &config.account_id),
            cookie: SecretString::from(config.cookie.expose_secret()),
        }
    }

    /// Titles listed on the viewing activity page, oldest first.
    pub async fn fetch_titles(&self) -> Result<Vec<String>, NetflixError> {
        info!("Checking for new watched medias on Netflix");

        let request = HttpRequest::get(self.activity_url.as_str())
            .header("Cookie", format!("NetflixId={}", self.cookie.expose_secret()));
        let response = self
            .transport
            .send(request)
            .await
            .map_err(NetflixError::Transport)?;

        if response.status != 200 {
            return Err(NetflixError::Status(response.status));
        }

        let titles = extract_titles(&response.text())?;
        debug!(count = titles.len(), "Viewing activity fetched");
        Ok(titles)
    }
}

#[async_trait]
impl ActivitySource for NetflixClient {
    type Error = NetflixError;

    fn source_name(&self) -> &str {
        "netflix"
    }

    async fn fetch_titles(&self) -> Result<Vec<String>, Self::Error> {
        NetflixClient::fetch_titles(self).await
    }
}

fn join_url(base: &str, account_id: &str) -> String {
    let account_id = account_id.trim_matches('/');
    if account_id.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), account_id)
}

/// Pulls `.retableRow .title a` out of the page. The page lists the newest entry
/// first, the result is reversed.
fn extract_titles(html: &str) -> Result<Vec<String>, NetflixError> {
    let row_selector = Selector::parse(".retableRow").map_err(|e| NetflixError::Html(e.to_string()))?;
    let link_selector = Selector::parse(".title a").map_err(|e| NetflixError::Html(e.to_string()))?;

    let document = Html::parse_document(html);
    let mut titles: Vec<String> = document
        .select(&row_selector)
        .map(|row| {
            let text: String = row.select(&link_selector).flat_map(|a| a.text()).collect();
            normalize_whitespace(&text)
        })
        .filter(|title| !title.is_empty())
        .collect();

    titles.reverse();
    Ok(titles)
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedTransport;

    const PAGE: &str = r#"
<html><body>
<ul class="structural retable stdHeight">
  <li class="retableRow">
    <div class="col date nowrap">5/1/24</div>
    <div class="col title"><a href="/title/81">Ali Wong: Hard Knock Wife</a></div>
  </li>
  <li class="retableRow">
    <div class="col date nowrap">4/30/24</div>
    <div class="col title"><a href="/title/82">Scott Pilgrim Takes Off:
        Scott Pilgrim Takes Off:   "Whatever"</a></div>
  </li>
  <li class="retableRow">
    <div class="col date nowrap">4/29/24</div>
    <div class="col title"><a href="/title/83">  Pain Hustlers </a></div>
  </li>
</ul>
</body></html>"#;

    fn config(url: &str, account_id: &str) -> NetflixConfig {
        NetflixConfig {
            account_id: account_id.to_string(),
            cookie: SecretString::from("cookie-value"),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_extract_titles_oldest_first() {
        let titles = extract_titles(PAGE).unwrap();
        assert_eq!(
            titles,
            vec![
                "Pain Hustlers".to_string(),
                r#"Scott Pilgrim Takes Off: Scott Pilgrim Takes Off: "Whatever""#.to_string(),
                "Ali Wong: Hard Knock Wife".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_titles_empty_page() {
        assert!(extract_titles("<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://www.netflix.com/viewingactivity", "ABC"), "https://www.netflix.com/viewingactivity/ABC");
        assert_eq!(join_url("https://www.netflix.com/viewingactivity/", "ABC"), "https://www.netflix.com/viewingactivity/ABC");
        assert_eq!(join_url("https://www.netflix.com/viewingactivity", ""), "https://www.netflix.com/viewingactivity");
    }

    #[tokio::test]
    async fn test_fetch_titles_sends_cookie() {
        let transport = ScriptedTransport::new();
        transport.respond(200, PAGE);

        let client = NetflixClient::new(&config("https://www.netflix.com/viewingactivity", "PROFILE"), transport.clone());
        let titles = client.fetch_titles().await.unwrap();
        assert_eq!(titles.len(), 3);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://www.netflix.com/viewingactivity/PROFILE");
        assert_eq!(requests[0].header_value("cookie"), Some("NetflixId=cookie-value"));
    }

    #[tokio::test]
    async fn test_fetch_titles_non_200_is_error() {
        let transport = ScriptedTransport::new();
        transport.respond(302, "");

        let client = NetflixClient::new(&config("https://www.netflix.com/viewingactivity", ""), transport.clone());
        let err = client.fetch_titles().await.unwrap_err();
        assert!(matches!(err, NetflixError::Status(302)));
        assert_eq!(err.to_string(), "http 302");
    }

    #[tokio::test]
    async fn test_fetch_titles_transport_error() {
        let transport = ScriptedTransport::new();
        transport.fail("timed out");

        let client = NetflixClient::new(&config("https://www.netflix.com/viewingactivity", "X"), transport.clone());
        let err = client.fetch_titles().await.unwrap_err();
        assert!(matches!(err, NetflixError::Transport(_)));
    }
}
