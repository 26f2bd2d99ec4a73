//! Browser-side checks: page objects, the login and create-template flows,
//! and the Chromium driver they run on.
mod chromium;
mod driver;
mod flows;
mod locator;
mod pages;

pub use chromium::ChromiumDriver;
pub use driver::{PageDriver, UiError};
pub use flows::UiFlows;
pub use locator::{Locator, Role};
pub use pages::{CreateTemplatePage, LoginPage};
