mod token;

pub use token::{AccessToken, AuthError, Credentials, TOKEN_PATH, get_token};
