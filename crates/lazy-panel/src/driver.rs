//! Headless browser adapter for the [`KeyPanel`] port

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use lazy_common::PanelConfig;
use lazy_core::{KeyOrder, KeyPanel, PanelError};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, instrument, warn};

use crate::parse::extract_key;
use crate::selectors as sel;
use crate::step::PanelStep;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Licensing panel driven through Chromium
///
/// Each call launches its own browser; nothing is shared between calls.
pub struct BrowserKeyPanel {
    config: PanelConfig,
}

impl BrowserKeyPanel {
    pub fn new(config: PanelConfig) -> Self {
        Self { config }
    }

    fn credentials(&self) -> Result<(&str, &str), PanelError> {
        self.config.credentials().ok_or(PanelError::MissingCredentials)
    }
}

impl std::fmt::Debug for BrowserKeyPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserKeyPanel")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl KeyPanel for BrowserKeyPanel {
    #[instrument(skip(self, order), fields(days = order.days))]
    async fn generate_key(&self, order: &KeyOrder) -> Result<String, PanelError> {
        let (username, password) = self.credentials()?;

        let session = Session::launch(&self.config).await?;
        let result = session.create_key(username, password, order).await;
        session.close().await;

        match &result {
            Ok(_) => info!("Panel key created"),
            Err(e) => warn!(error = %e, "Panel key creation failed"),
        }
        result
    }

    #[instrument(skip(self, key))]
    async fn reset_hwid(&self, key: &str) -> Result<(), PanelError> {
        let (username, password) = self.credentials()?;

        let session = Session::launch(&self.config).await?;
        let result = session.reset_hwid(username, password, key).await;
        session.close().await;

        match &result {
            Ok(()) => info!("Panel HWID reset"),
            Err(e) => warn!(error = %e, "Panel HWID reset failed"),
        }
        result
    }
}

/// Run one browser call under the step timeout
async fn within<T>(
    step: PanelStep,
    limit: Duration,
    fut: impl Future<Output = Result<T, CdpError>>,
) -> Result<T, PanelError> {
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(PanelError::Browser(format!("{step}: {e}"))),
        Err(_) => Err(PanelError::NavigationTimeout(step.to_string())),
    }
}

fn js_string(value: &str) -> Result<String, PanelError> {
    serde_json::to_string(value).map_err(|e| PanelError::Browser(e.to_string()))
}

/// One launched browser with a single page
struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    url: String,
    timeout: Duration,
}

impl Session {
    async fn launch(config: &PanelConfig) -> Result<Self, PanelError> {
        let limit = config.timeout();
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .request_timeout(limit);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(PanelError::Browser)?;

        let (mut browser, mut events) =
            within(PanelStep::Launch, limit, Browser::launch(browser_config)).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match within(PanelStep::Launch, limit, browser.new_page("about:blank")).await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close) = browser.close().await {
                    warn!(error = %close, "Browser did not close cleanly");
                }
                handler.abort();
                return Err(e);
            }
        };

        debug!("Browser launched");
        Ok(Self {
            browser,
            handler,
            page,
            url: config.url.clone(),
            timeout: limit,
        })
    }

    /// Poll for an element until the step timeout runs out
    async fn wait_for(&self, step: PanelStep, selector: &str) -> Result<Element, PanelError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(e) if Instant::now() >= deadline => {
                    debug!(step = %step, error = %e, "Element never appeared");
                    return Err(PanelError::SelectorNotFound(selector.to_string()));
                }
                Err(_) => sleep(POLL_INTERVAL).await,
            }
        }
    }

    async fn goto(&self, step: PanelStep, url: &str) -> Result<(), PanelError> {
        within(step, self.timeout, self.page.goto(url)).await?;
        Ok(())
    }

    async fn click(&self, step: PanelStep, selector: &str) -> Result<(), PanelError> {
        let element = self.wait_for(step, selector).await?;
        within(step, self.timeout, element.click()).await?;
        Ok(())
    }

    async fn click_and_navigate(&self, step: PanelStep, selector: &str) -> Result<(), PanelError> {
        self.click(step, selector).await?;
        within(step, self.timeout, self.page.wait_for_navigation()).await?;
        Ok(())
    }

    /// Set a form control's value directly and fire its change event
    async fn set_value(&self, step: PanelStep, selector: &str, value: &str) -> Result<(), PanelError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); \
             el.value = {}; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true; }})()",
            js_string(selector)?,
            js_string(value)?
        );
        within(step, self.timeout, self.page.evaluate(script)).await?;
        Ok(())
    }

    /// Clear a field, then type into it like a user would
    async fn type_into(&self, step: PanelStep, selector: &str, text: &str) -> Result<(), PanelError> {
        let element = self.wait_for(step, selector).await?;
        self.set_value(step, selector, "").await?;
        within(step, self.timeout, element.click()).await?;
        within(step, self.timeout, element.type_str(text)).await?;
        Ok(())
    }

    async fn value_of(&self, step: PanelStep, selector: &str) -> Result<String, PanelError> {
        let script = format!("document.querySelector({}).value", js_string(selector)?);
        let result = within(step, self.timeout, self.page.evaluate(script)).await?;
        result
            .into_value::<String>()
            .map_err(|e| PanelError::Browser(format!("{step}: {e}")))
    }

    async fn login(&self, username: &str, password: &str) -> Result<(), PanelError> {
        self.goto(PanelStep::OpenLogin, &self.url).await?;
        self.wait_for(PanelStep::OpenLogin, sel::LOGIN_USERNAME).await?;

        self.type_into(PanelStep::SubmitLogin, sel::LOGIN_USERNAME, username).await?;
        self.type_into(PanelStep::SubmitLogin, sel::LOGIN_PASSWORD, password).await?;
        self.click_and_navigate(PanelStep::SubmitLogin, sel::LOGIN_SUBMIT).await?;
        debug!("Logged in to panel");
        Ok(())
    }

    async fn create_key(&self, username: &str, password: &str, order: &KeyOrder) -> Result<String, PanelError> {
        self.login(username, password).await?;

        self.click_and_navigate(PanelStep::OpenForm, &sel::nav_key_create()).await?;
        self.wait_for(PanelStep::OpenForm, sel::CREATE_FORM).await?;

        let count = order.count.max(1).to_string();
        self.type_into(PanelStep::FillForm, sel::CREATE_COUNT, &count).await?;
        self.type_into(PanelStep::FillForm, sel::CREATE_DAYS, &order.days.to_string()).await?;
        self.type_into(PanelStep::FillForm, sel::CREATE_NOTE, &order.note).await?;

        self.click_and_navigate(PanelStep::Submit, sel::CREATE_SUBMIT).await?;
        self.wait_for(PanelStep::AwaitResult, sel::CREATED_KEYS).await?;

        let text = self.value_of(PanelStep::Scrape, sel::CREATED_KEYS).await?;
        extract_key(&text).ok_or(PanelError::KeyNotFound)
    }

    async fn reset_hwid(&self, username: &str, password: &str, key: &str) -> Result<(), PanelError> {
        self.login(username, password).await?;

        self.click(PanelStep::OpenForm, &sel::nav_key_search()).await?;
        self.wait_for(PanelStep::OpenForm, sel::SEARCH_FIELD).await?;

        self.set_value(PanelStep::FillForm, sel::SEARCH_FIELD, sel::SEARCH_FIELD_KEY).await?;
        self.type_into(PanelStep::FillForm, sel::SEARCH_INPUT, key).await?;

        self.click(PanelStep::Submit, sel::SEARCH_SUBMIT).await?;
        self.wait_for(PanelStep::AwaitResult, sel::SEARCH_RESULT_ROW).await?;

        self.click(PanelStep::Scrape, sel::RESET_HWID_BADGE).await
    }

    /// Shut the browser down; failures are only logged
    async fn close(mut self) {
        match timeout(self.timeout, self.browser.close()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(step = %PanelStep::Close, error = %e, "Browser did not close cleanly"),
            Err(_) => warn!(step = %PanelStep::Close, "Browser close timed out"),
        }
        if let Ok(Err(e)) = timeout(self.timeout, self.browser.wait()).await {
            warn!(error = %e, "Browser process wait failed");
        }
        self.handler.abort();
        debug!("Browser closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: Option<&str>, password: Option<&str>) -> PanelConfig {
        PanelConfig {
            url: "http://127.0.0.1:9/".to_string(),
            username: username.map(String::from),
            password: password.map(String::from),
            headless: true,
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_launch() {
        let panel = BrowserKeyPanel::new(config(None, None));
        let err = panel
            .generate_key(&KeyOrder::single(7, "note"))
            .await
            .unwrap_err();
        assert_eq!(err, PanelError::MissingCredentials);

        let panel = BrowserKeyPanel::new(config(Some("admin"), None));
        assert_eq!(
            panel.reset_hwid("ABC123").await.unwrap_err(),
            PanelError::MissingCredentials
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let panel = BrowserKeyPanel::new(config(Some("admin"), Some("hunter2")));
        assert!(!format!("{panel:?}").contains("hunter2"));
    }

    #[test]
    fn test_js_string_quotes_selectors() {
        assert_eq!(js_string("#a > b").unwrap(), "\"#a > b\"");
        assert_eq!(js_string("it's \"x\"").unwrap(), "\"it's \\\"x\\\"\"");
    }

    #[tokio::test]
    async fn test_within_reports_timeout_step() {
        let err = within(PanelStep::Submit, Duration::from_millis(10), async {
            sleep(Duration::from_secs(5)).await;
            Ok::<(), CdpError>(())
        })
        .await
        .unwrap_err();
        assert_eq!(err, PanelError::NavigationTimeout("submit".to_string()));
    }
}
