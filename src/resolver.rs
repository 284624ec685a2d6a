//! Tiered resolution of a reported case to the file that declares it.
//!
//! Tiers are tried in order and the first hit wins:
//!
//! 0. `<classname>.<name>` against import-path keys (exact, when enabled)
//! 1. `<last classname segment>.<name>`
//! 2. `<name>` on its own
//! 3. tiers 1-2 again with the parent test (text before the first `/`),
//!    covering subtests and fuzz corpus entries such as `FuzzAdd/ff5b0490`
//! 4. first key containing `<name>`, then the parent, as a substring
//!
//! Tier 4 returns *a* plausible file, not necessarily the right one, and can
//! be switched off through [`MatchPolicy::substring_fallback`].

use crate::config::MatchPolicy;
use crate::source_index::SourceIndex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    ImportPath,
    PackageQualified,
    BareName,
    ParentPackageQualified,
    ParentBareName,
    Substring,
}

impl MatchTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImportPath => "import_path",
            Self::PackageQualified => "package_qualified",
            Self::BareName => "bare_name",
            Self::ParentPackageQualified => "parent_package_qualified",
            Self::ParentBareName => "parent_bare_name",
            Self::Substring => "substring",
        }
    }

    /// Whether the tier is an exact key lookup.
    #[must_use]
    pub const fn is_exact(self) -> bool {
        !matches!(self, Self::Substring)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub path: &'a str,
    pub tier: MatchTier,
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a SourceIndex,
    policy: MatchPolicy,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub const fn new(index: &'a SourceIndex, policy: MatchPolicy) -> Self {
        Self { index, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> MatchPolicy {
        self.policy
    }

    #[must_use]
    pub fn resolve(&self, classname: &str, name: &str) -> Option<Resolution<'a>> {
        let package = last_segment(classname);
        let parent = parent_test(name);

        if self.policy.qualified_keys && !classname.is_empty() {
            let found = self
                .index
                .get_qualified(&format!("{classname}.{name}"))
                .or_else(|| {
                    parent.and_then(|p| self.index.get_qualified(&format!("{classname}.{p}")))
                });
            if let Some(path) = found {
                return Some(hit(path, MatchTier::ImportPath));
            }
        }

        if let Some(found) = self.exact(package, name, MatchTier::PackageQualified, MatchTier::BareName)
        {
            return Some(found);
        }

        if let Some(parent) = parent {
            if let Some(found) = self.exact(
                package,
                parent,
                MatchTier::ParentPackageQualified,
                MatchTier::ParentBareName,
            ) {
                return Some(found);
            }
        }

        if self.policy.substring_fallback {
            let found = self
                .first_key_containing(name)
                .or_else(|| parent.and_then(|p| self.first_key_containing(p)));
            if let Some(path) = found {
                return Some(hit(path, MatchTier::Substring));
            }
        }

        None
    }

    fn exact(
        &self,
        package: &str,
        name: &str,
        qualified_tier: MatchTier,
        bare_tier: MatchTier,
    ) -> Option<Resolution<'a>> {
        if !package.is_empty() {
            if let Some(path) = self.index.get(&format!("{package}.{name}")) {
                return Some(hit(path, qualified_tier));
            }
        }
        self.index.get(name).map(|path| hit(path, bare_tier))
    }

    fn first_key_containing(&self, needle: &str) -> Option<&'a str> {
        if needle.is_empty() {
            return None;
        }
        self.index
            .iter()
            .find(|(key, _)| key.contains(needle))
            .map(|(_, path)| path)
    }
}

/// Resolve with a throwaway [`Resolver`].
#[must_use]
pub fn resolve<'a>(
    classname: &str,
    name: &str,
    index: &'a SourceIndex,
    policy: MatchPolicy,
) -> Option<Resolution<'a>> {
    Resolver::new(index, policy).resolve(classname, name)
}

const fn hit(path: &str, tier: MatchTier) -> Resolution<'_> {
    Resolution { path, tier }
}

/// Final `/`-separated component, which strips the module prefix from an
/// import path like `example.com/repo/pkg`.
fn last_segment(classname: &str) -> &str {
    classname.rsplit('/').next().unwrap_or_default()
}

fn parent_test(name: &str) -> Option<&str> {
    name.split_once('/').map(|(parent, _)| parent)
}
