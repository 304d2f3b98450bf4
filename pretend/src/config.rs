/// Configuration for a [`Session`](crate::Session).
///
/// Names the bot and lists the users and rooms to create on
/// [`Session::start`](crate::Session::start). Use the builder methods to
/// customize, or [`Default`] for a bot called `hubot` with nobody around.
///
/// # Examples
///
/// ```rust
/// use pretend::Config;
///
/// let config = Config::default()
///     .with_name("buddy")
///     .with_alias("!")
///     .with_users(["alice", "bob"])
///     .with_rooms(["general"]);
///
/// assert_eq!(config.name(), "buddy");
/// assert_eq!(config.users(), ["alice", "bob"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Name the bot answers to and sends as.
    /// Default: `hubot`
    name: String,

    /// Optional short alias the bot also answers to.
    /// Default: none
    alias: Option<String>,

    /// Users created on start.
    users: Vec<String>,

    /// Rooms created on start.
    rooms: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: "hubot".to_owned(),
            alias: None,
            users: Vec::new(),
            rooms: Vec::new(),
        }
    }
}

impl Config {
    /// Set the bot name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the bot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the bot alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the bot alias, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Set the users to create on start.
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the users created on start.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Set the rooms to create on start.
    pub fn with_rooms<I, S>(mut self, rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rooms = rooms.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the rooms created on start.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.name(), "hubot");
        assert_eq!(config.alias(), None);
        assert!(config.users().is_empty());
        assert!(config.rooms().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let config = Config::default().with_alias("hu").with_rooms(["general"]);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
