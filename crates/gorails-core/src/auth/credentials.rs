use std::fmt;

/// Login identifier and secret. Lives only for the duration of a login call.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.identifier.trim().is_empty() && !self.secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secret() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("me@example.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_is_complete() {
        assert!(Credentials::new("a@b.c", "pw").is_complete());
        assert!(!Credentials::new("  ", "pw").is_complete());
        assert!(!Credentials::new("a@b.c", "").is_complete());
    }
}
