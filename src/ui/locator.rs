/// ARIA roles the page objects query by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Button,
    Heading,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Button => "button",
            Role::Heading => "heading",
        }
    }

    fn selector(&self) -> &'static str {
        match self {
            Role::Button => {
                r#"button, [role="button"], input[type="button"], input[type="submit"]"#
            }
            Role::Heading => r#"h1, h2, h3, h4, h5, h6, [role="heading"]"#,
        }
    }
}

/// How a page element is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    /// Innermost element whose text contains the value, ignoring case.
    Text(String),
    Role { role: Role, name: String },
    /// Elements matching `css` whose text contains `text`.
    CssWithText { css: String, text: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }

    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Locator::Role {
            role,
            name: name.into(),
        }
    }

    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Locator::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// JavaScript expression evaluating to the array of matching elements.
    ///
    /// Relies on a `__matches(element, text)` helper in scope.
    pub(crate) fn query_script(&self) -> String {
        let all = |css: &str| {
            format!(
                "Array.from(document.querySelectorAll({}))",
                js_string(css)
            )
        };
        match self {
            Locator::Css(css) => all(css),
            Locator::Text(text) => format!(
                "{}.filter(el => __matches(el, {t}) && !Array.from(el.children).some(c => __matches(c, {t})))",
                all("body *"),
                t = js_string(text)
            ),
            Locator::Role { role, name } => format!(
                "{}.filter(el => __matches(el, {}))",
                all(role.selector()),
                js_string(name)
            ),
            Locator::CssWithText { css, text } => format!(
                "{}.filter(el => __matches(el, {}))",
                all(css),
                js_string(text)
            ),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "css={}", css),
            Locator::Text(text) => write!(f, "text={}", text),
            Locator::Role { role, name } => write!(f, "role={}[name={:?}]", role.as_str(), name),
            Locator::CssWithText { css, text } => write!(f, "css={} >> has-text={:?}", css, text),
        }
    }
}

fn js_string(s: &str) -> String {
    // A JSON string literal is a valid JavaScript string literal
    serde_json::Value::String(s.to_string()).to_string()
}
