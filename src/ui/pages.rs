use crate::ui::{Locator, Role};

pub struct LoginPage {
    pub login_button: Locator,
    pub register_button: Locator,
    pub username_field: Locator,
    pub password_field: Locator,
    pub continue_button: Locator,
    pub logged_in_marker: Locator,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            login_button: Locator::text("Log In"),
            register_button: Locator::text("Sign Up"),
            username_field: Locator::css("#username"),
            password_field: Locator::css("#password"),
            continue_button: Locator::role(Role::Button, "Continue"),
            logged_in_marker: Locator::text("Log Out"),
        }
    }
}

pub struct CreateTemplatePage {
    pub create_template_menu: Locator,
    pub account_selector: Locator,
    pub account_dropdown: Locator,
    pub create_template_header: Locator,
}

impl Default for CreateTemplatePage {
    fn default() -> Self {
        Self {
            create_template_menu: Locator::css(r#"li[title="Create Pass Template"]"#),
            account_selector: Locator::text("Master Account"),
            account_dropdown: Locator::css_with_text(
                ".ant-select-dropdown .ant-select-item",
                "Testing 1",
            ),
            create_template_header: Locator::role(Role::Heading, "Create Pass Template"),
        }
    }
}
