//! Translation between external RIDs and internal store ids.
//!
//! The pattern of a resource class is captured exactly once, by the
//! registration callback that runs before any traffic is accepted. A
//! [`PatternRegistry`] holds the write-once slot; an [`IdentityMapper`] can only
//! be obtained after registration and is the read-only view used afterwards.

use crate::{Error, PathParams, Pattern, ResourceId, Result, Rid};
use std::sync::{Arc, OnceLock};

/// Write-once holder for the pattern of one resource class.
#[derive(Debug)]
pub struct PatternRegistry {
    /// Name of the tag bound to the internal key.
    tag: String,
    pattern: OnceLock<Arc<Pattern>>,
}

impl PatternRegistry {
    /// Creates an empty registry for patterns keyed by `tag` (without `$`).
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            pattern: OnceLock::new(),
        }
    }

    /// Captures the pattern. Only the first call succeeds.
    ///
    /// The pattern must carry exactly one tag, and it must be the registry's
    /// tag.
    pub fn register(&self, pattern: &str) -> Result<()> {
        let parsed = Pattern::parse(pattern)?;

        let tag_count = parsed.tags().count();
        if tag_count != 1 {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: format!("expected exactly one tag, found {tag_count}"),
            });
        }
        if !parsed.has_tag(&self.tag) {
            return Err(Error::TagMismatch {
                pattern: pattern.to_owned(),
                tag: self.tag.clone(),
            });
        }

        self.pattern
            .set(Arc::new(parsed))
            .map_err(|_| Error::PatternAlreadyRegistered(self.registered_pattern()))
    }

    /// Returns true once a pattern has been captured.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.pattern.get().is_some()
    }

    /// Returns the captured pattern, if any.
    #[must_use]
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.get().map(|p| &**p)
    }

    /// Returns the tag name this registry binds to the internal key.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns a mapper over the captured pattern.
    pub fn mapper(&self) -> Result<IdentityMapper> {
        let pattern = self.pattern.get().ok_or(Error::PatternNotRegistered)?;
        Ok(IdentityMapper {
            pattern: Arc::clone(pattern),
            tag: Arc::from(self.tag.as_str()),
        })
    }

    fn registered_pattern(&self) -> String {
        self.pattern()
            .map(|p| p.as_str().to_owned())
            .unwrap_or_default()
    }
}

/// Translates ids in both directions using a registered pattern.
#[derive(Debug, Clone)]
pub struct IdentityMapper {
    pattern: Arc<Pattern>,
    tag: Arc<str>,
}

impl IdentityMapper {
    /// Extracts the internal id from tag values of an already-matched RID.
    #[must_use]
    pub fn rid_to_id(&self, params: &PathParams) -> Option<ResourceId> {
        params.get(&*self.tag).map(|v| ResourceId::new(v.as_str()))
    }

    /// Matches `rid` against the pattern and extracts the internal id.
    #[must_use]
    pub fn resolve(&self, rid: &Rid) -> Option<ResourceId> {
        self.pattern
            .matches(rid.as_str())
            .and_then(|params| self.rid_to_id(&params))
    }

    /// Builds the external RID for an internal id.
    #[must_use]
    pub fn id_to_rid(&self, id: &ResourceId) -> Rid {
        Rid::new(self.pattern.replace_tag(&self.tag, id.as_str()))
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}
