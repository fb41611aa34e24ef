//! Docker image reference parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Tag assumed when a reference carries neither tag nor digest.
pub const LATEST_TAG: &str = "latest";

/// A parsed image reference of the form
/// `[registry[:port]/]repository[:tag][@digest]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageReference {
    /// Parse an image reference.
    ///
    /// The registry part may contain a port (`localhost:5000/firebird`);
    /// only a colon after the last `/` starts a tag.
    pub fn parse(reference: &str) -> Result<Self, Error> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(Error::InvalidImageReference("empty reference".into()));
        }
        if reference.chars().any(char::is_whitespace) {
            return Err(Error::InvalidImageReference(format!(
                "{reference}: contains whitespace"
            )));
        }

        let (name, digest) = match reference.split_once('@') {
            Some((name, digest)) if digest.is_empty() => {
                return Err(Error::InvalidImageReference(format!(
                    "{name}: empty digest"
                )));
            }
            Some((name, digest)) => (name, Some(digest.to_string())),
            None => (reference, None),
        };

        let last_slash = name.rfind('/');
        let (repository, tag) = match name.rfind(':') {
            Some(colon) if last_slash.is_none_or(|slash| colon > slash) => {
                let tag = &name[colon + 1..];
                if tag.is_empty() {
                    return Err(Error::InvalidImageReference(format!("{name}: empty tag")));
                }
                (&name[..colon], Some(tag.to_string()))
            }
            _ => (name, None),
        };

        if repository.is_empty()
            || repository.starts_with('/')
            || repository.ends_with('/')
            || repository.contains("//")
        {
            return Err(Error::InvalidImageReference(format!(
                "{reference}: malformed repository"
            )));
        }

        Ok(Self {
            repository: repository.to_string(),
            tag,
            digest,
        })
    }

    /// Create a reference from a repository and tag.
    pub fn with_tag(repository: &str, tag: &str) -> Result<Self, Error> {
        Self::parse(&format!("{repository}:{tag}"))
    }

    /// Create a reference from parts known to be well formed, such as constants.
    #[must_use]
    pub fn from_parts(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: Some(tag.into()),
            digest: None,
        }
    }

    /// The reference without tag or digest, registry included.
    #[must_use]
    pub fn unversioned(&self) -> &str {
        &self.repository
    }

    /// The explicit tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The pinned digest, if any.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The version part: the tag, else the digest, else `latest`.
    #[must_use]
    pub fn version(&self) -> &str {
        self.tag
            .as_deref()
            .or(self.digest.as_deref())
            .unwrap_or(LATEST_TAG)
    }
}

impl FromStr for ImageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}
