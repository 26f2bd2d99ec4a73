use crate::configuration::UiSettings;
use crate::ui::{Locator, PageDriver, UiError};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const TARGET_ATTRIBUTE: &str = "data-litecard-e2e-target";
const QUIET_PERIOD: Duration = Duration::from_millis(500);

const HELPERS: &str = r#"
const __matches = (el, text) =>
  ((el.innerText || el.textContent || el.value || '') + '').toLowerCase().includes(text.toLowerCase());
const __visible = el => {
  const rect = el.getBoundingClientRect();
  const style = window.getComputedStyle(el);
  return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none';
};
"#;

/// [`PageDriver`] backed by a Chromium instance spoken to over CDP.
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    timeout: Duration,
    next_target: AtomicU64,
}

impl ChromiumDriver {
    #[tracing::instrument(name = "Launching Chromium", skip_all, fields(headless = settings.headless))]
    pub async fn launch(settings: &UiSettings) -> Result<Self, UiError> {
        let mut builder = BrowserConfig::builder();
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(UiError::Launch)?;
        let (browser, mut handler) = Browser::launch(config).await?;

        // The CDP connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "Browser handler stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        Ok(Self {
            browser,
            page,
            handler,
            timeout: settings.timeout(),
            next_target: AtomicU64::new(0),
        })
    }

    pub async fn close(mut self) -> Result<(), UiError> {
        self.browser.close().await?;
        if let Err(e) = self.handler.await {
            tracing::warn!(error.message = %e, "Browser handler task did not shut down cleanly");
        }
        Ok(())
    }

    async fn evaluate<T>(&self, script: String) -> Result<T, UiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self.page.evaluate(script).await?;
        Ok(result.into_value()?)
    }

    /// Tag the first visible match so CDP can address it by selector.
    async fn tag(&self, locator: &Locator) -> Result<String, UiError> {
        let target = self.next_target.fetch_add(1, Ordering::Relaxed).to_string();
        let script = format!(
            "(() => {{ {helpers} const el = {query}.find(__visible); \
             if (!el) return false; el.setAttribute({attr:?}, {target:?}); return true; }})()",
            helpers = HELPERS,
            query = locator.query_script(),
            attr = TARGET_ATTRIBUTE,
            target = target,
        );
        if self.evaluate::<bool>(script).await? {
            Ok(format!(r#"[{}="{}"]"#, TARGET_ATTRIBUTE, target))
        } else {
            Err(UiError::NotFound(locator.to_string()))
        }
    }
}

#[async_trait::async_trait]
impl PageDriver for ChromiumDriver {
    #[tracing::instrument(skip(self))]
    async fn goto(&self, url: &str) -> Result<(), UiError> {
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<(), UiError> {
        let selector = self.tag(locator).await?;
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), UiError> {
        let selector = self.tag(locator).await?;
        self.evaluate::<bool>(format!(
            "(() => {{ const el = document.querySelector({:?}); el.value = ''; \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); return true; }})()",
            selector
        ))
        .await?;
        self.page
            .find_element(selector)
            .await?
            .click()
            .await?
            .type_str(value)
            .await?;
        Ok(())
    }

    /// Wait until the document is loaded and no new resource was fetched for
    /// a short quiet period.
    async fn wait_for_network_idle(&self) -> Result<(), UiError> {
        let deadline = Instant::now() + self.timeout;
        let readiness = "document.readyState === 'complete' \
            ? performance.getEntriesByType('resource').length : -1"
            .to_string();
        let mut last_seen: Option<(i64, Instant)> = None;
        loop {
            let count: i64 = self.evaluate(readiness.clone()).await?;
            let now = Instant::now();
            match last_seen {
                Some((previous, since)) if previous == count && count >= 0 => {
                    if now.duration_since(since) >= QUIET_PERIOD {
                        return Ok(());
                    }
                }
                _ => last_seen = Some((count, now)),
            }
            if now >= deadline {
                return Err(UiError::NetworkNotIdle(self.timeout));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, UiError> {
        let script = format!(
            "(() => {{ {} return {}.some(__visible); }})()",
            HELPERS,
            locator.query_script()
        );
        self.evaluate(script).await
    }
}
