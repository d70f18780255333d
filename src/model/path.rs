use std::fmt;

use thiserror::Error;

pub const DELIMITER: char = '/';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid resource name: {0:?}")]
    InvalidName(String),

    #[error("the root path does not address a blob")]
    EmptyBlobPath,
}

/// A single path segment. Never empty and never contains the delimiter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Result<Self, PathError> {
        let name = name.into();
        if name.is_empty() || name.contains(DELIMITER) {
            return Err(PathError::InvalidName(name));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourcePathType {
    LeafResource,
    Prefix,
}

/// A location in the hierarchical namespace. Zero segments is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    segments: Vec<ResourceName>,
}

impl ResourcePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<ResourceName>) -> Self {
        Self { segments }
    }

    /// Parses a `/` separated path. Empty segments (leading, trailing or doubled
    /// delimiters) are ignored, so `""` and `"/"` both parse to the root.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = path
            .split(DELIMITER)
            .filter(|segment| !segment.is_empty())
            .map(ResourceName::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[ResourceName] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn join(&self, name: ResourceName) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name);
        Self { segments }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DELIMITER)?;
            }
            f.write_str(segment.as_str())?;
        }

        Ok(())
    }
}

/// A path known to address a single object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobPath(ResourcePath);

impl BlobPath {
    pub fn as_path(&self) -> &ResourcePath {
        &self.0
    }
}

impl TryFrom<ResourcePath> for BlobPath {
    type Error = PathError;

    fn try_from(path: ResourcePath) -> Result<Self, Self::Error> {
        if path.is_root() {
            return Err(PathError::EmptyBlobPath);
        }

        Ok(Self(path))
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A path known to address a hierarchy level. The root is a valid prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PrefixPath(ResourcePath);

impl PrefixPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn as_path(&self) -> &ResourcePath {
        &self.0
    }
}

impl From<ResourcePath> for PrefixPath {
    fn from(path: ResourcePath) -> Self {
        Self(path)
    }
}

impl fmt::Display for PrefixPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
