use core_logic::{Credential, CredentialError};

pub const HEADER_PLAYER_ID: &str = "X-Player-Id";
pub const HEADER_SESSION_TOKEN: &str = "X-Masterhash";

/// Everything one account turn knows about its login. Created when the turn
/// starts and dropped when it ends; never shared with another account.
#[derive(Debug, Clone)]
pub struct AccountSession {
    credential: Credential,
    display_name: String,
    player_id: u64,
    token: Option<String>,
}

impl AccountSession {
    pub fn new(credential: Credential) -> Result<Self, CredentialError> {
        let identity = credential.identity()?;
        Ok(Self {
            display_name: identity.display_name(),
            player_id: identity.id,
            credential,
            token: None,
        })
    }

    /// Value sent as `initData` in every request body
    pub fn init_data(&self) -> &str {
        self.credential.expose()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn player_id(&self) -> u64 {
        self.player_id
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Caches the server-issued session token. Only the first one sticks;
    /// returns whether it was taken.
    pub fn adopt_token(&mut self, token: Option<&str>) -> bool {
        match token {
            Some(t) if self.token.is_none() && !t.is_empty() => {
                self.token = Some(t.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![(HEADER_PLAYER_ID.to_string(), self.player_id.to_string())];
        if let Some(token) = &self.token {
            headers.push((HEADER_SESSION_TOKEN.to_string(), token.clone()));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "user=%7B%22id%22%3A42%2C%22first_name%22%3A%22Tsubasa%22%7D&hash=z";

    #[test]
    fn test_session_derives_identity() {
        let session = AccountSession::new(Credential::new(RAW)).unwrap();
        assert_eq!(session.display_name(), "Tsubasa");
        assert_eq!(session.player_id(), 42);
        assert_eq!(session.init_data(), RAW);
    }

    #[test]
    fn test_first_token_wins() {
        let mut session = AccountSession::new(Credential::new(RAW)).unwrap();
        assert_eq!(session.headers().len(), 1);

        assert!(!session.adopt_token(None));
        assert!(session.adopt_token(Some("hash-1")));
        assert!(!session.adopt_token(Some("hash-2")));

        assert_eq!(session.token(), Some("hash-1"));
        assert!(session
            .headers()
            .contains(&(HEADER_SESSION_TOKEN.to_string(), "hash-1".to_string())));
    }

    #[test]
    fn test_sessions_do_not_share_tokens() {
        let mut first = AccountSession::new(Credential::new(RAW)).unwrap();
        first.adopt_token(Some("hash-1"));
        let second = AccountSession::new(Credential::new(RAW)).unwrap();
        assert_eq!(second.token(), None);
    }
}
