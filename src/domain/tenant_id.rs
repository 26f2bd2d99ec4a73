/// Business id sent as `x-active-business-id` to scope calls to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantId(String);

impl TenantId {
    pub fn parse(s: String) -> Result<TenantId, String> {
        let is_empty_or_whitespace = s.trim().is_empty();
        let contains_whitespace = s.chars().any(char::is_whitespace);
        if is_empty_or_whitespace || contains_whitespace {
            Err(format!("{:?} is not a valid tenant id.", s))
        } else {
            Ok(Self(s))
        }
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
