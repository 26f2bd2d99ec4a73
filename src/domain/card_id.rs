/// Server-assigned identifier of a card (pass).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    pub fn parse(s: String) -> Result<CardId, String> {
        if s.trim().is_empty() {
            Err("A card id cannot be empty.".to_string())
        } else if s.contains('/') {
            // Card ids are interpolated into `/api/v1/card/{id}`
            Err(format!("{} is not a valid card id.", s))
        } else {
            Ok(Self(s))
        }
    }
}

impl TryFrom<String> for CardId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CardId> for String {
    fn from(value: CardId) -> Self {
        value.0
    }
}

impl AsRef<str> for CardId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
