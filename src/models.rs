use std::fmt;

/// Identifies one outbound request. Issued in strictly increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub fn advance(&mut self) -> RequestToken {
        self.0 += 1;
        *self
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Credential typed into the prompt. An empty string means "no password".
#[derive(Default, Clone)]
pub struct Password(pub Option<String>);

impl Password {
    pub fn set(&mut self, value: String) {
        self.0 = if value.is_empty() { None } else { Some(value) };
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        let mut password = Password::default();
        password.set(value);
        password
    }
}

// Never print the secret itself.
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Password(***)"),
            None => f.write_str("Password(None)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMeta {
    pub name: String,
    pub size_compressed: String,
    pub size_uncompressed: String,
}

/// An archive that was opened successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    pub path: String,
    pub meta: ArchiveMeta,
    pub entries: Vec<String>,
}

/// What the session asks the backend to open.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    /// `None` lets the backend ask the user to pick a file.
    pub path: Option<String>,
    pub password: Password,
}

impl OpenRequest {
    pub fn new(path: Option<String>, password: Password) -> Self {
        Self { path, password }
    }
}

/// An archive waiting for the user to type its password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPasswordRequest {
    pub path: String,
    /// Why the previous attempt was refused, e.g. a wrong password.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub name: String,
    pub path: String,
}

/// Recently opened archives in the order the backend returned them.
pub type HistoryList = Vec<HistoryEntry>;
