use crate::authentication::Credentials;
use crate::ui::{CreateTemplatePage, Locator, LoginPage, PageDriver, UiError};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Linear UI flows driven through a [`PageDriver`].
///
/// Every interaction first waits for its target to become visible, bounded by
/// `timeout`.
pub struct UiFlows<'a> {
    driver: &'a dyn PageDriver,
    timeout: Duration,
}

impl<'a> UiFlows<'a> {
    pub fn new(driver: &'a dyn PageDriver, timeout: Duration) -> Self {
        Self { driver, timeout }
    }

    #[tracing::instrument(name = "Opening the login screen", skip(self))]
    pub async fn open_login(&self, base_url: &str) -> Result<(), UiError> {
        let page = LoginPage::default();
        self.driver.goto(base_url).await?;
        self.click(&page.login_button).await
    }

    #[tracing::instrument(
        name = "Logging in through the UI",
        skip_all,
        fields(username = %credentials.username)
    )]
    pub async fn login(&self, credentials: &Credentials) -> Result<(), UiError> {
        let page = LoginPage::default();
        self.fill(&page.username_field, &credentials.username).await?;
        self.fill(&page.password_field, credentials.password.expose_secret())
            .await?;
        self.click(&page.continue_button).await?;
        self.driver.wait_for_network_idle().await?;
        self.expect_visible(&page.logged_in_marker).await
    }

    #[tracing::instrument(name = "Opening the create-template screen", skip(self))]
    pub async fn create_template(&self) -> Result<(), UiError> {
        let page = CreateTemplatePage::default();
        self.click(&page.account_selector).await?;
        self.click(&page.account_dropdown).await?;
        self.driver.wait_for_network_idle().await?;
        self.click(&page.create_template_menu).await?;
        self.expect_visible(&page.create_template_header).await
    }

    pub async fn expect_visible(&self, locator: &Locator) -> Result<(), UiError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if self.driver.is_visible(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                tracing::error!(%locator, "Element never became visible");
                return Err(UiError::NotVisible {
                    locator: locator.to_string(),
                    timeout: self.timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, locator: &Locator) -> Result<(), UiError> {
        self.expect_visible(locator).await?;
        tracing::debug!(%locator, "click");
        self.driver.click(locator).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), UiError> {
        self.expect_visible(locator).await?;
        tracing::debug!(%locator, "fill");
        self.driver.fill(locator, value).await
    }
}
