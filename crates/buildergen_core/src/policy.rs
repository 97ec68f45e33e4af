//! Package-boundary policy: which packages count as local to the unit being generated.
//!
//! Only local record types get nested builders. A foreign record is exposed through a plain setter because its
//! builder, if any, lives in a unit this run does not own.
//!
//! Packages are module paths (`crate::model`). A path reached through a renamed import is rendered by the front end
//! as `alias "crate::model"`; such a package is local when the quoted part is the target.

/// Local-vs-foreign decision for one target package.
#[derive(Debug, Clone, Copy)]
pub struct PackagePolicy<'a> {
    target: &'a str,
}

impl<'a> PackagePolicy<'a> {
    pub fn new(target: &'a str) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &'a str {
        self.target
    }

    /// Exact match, or the target quoted at the end of the rendering.
    pub fn is_local(&self, package: &str) -> bool {
        if package == self.target {
            return true;
        }
        package
            .strip_suffix('"')
            .and_then(|rest| rest.strip_suffix(self.target))
            .is_some_and(|rest| rest.ends_with('"'))
    }
}

/// Render a package reached through a renamed import.
pub fn quoted(alias_path: &str, package: &str) -> String {
    format!("{alias_path} \"{package}\"")
}

/// The module path inside a quoted rendering, or the package itself.
pub fn canonical_package(package: &str) -> &str {
    match package.strip_suffix('"').and_then(|rest| rest.split_once('"')) {
        Some((_, inner)) => inner,
        None => package,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_local() {
        let policy = PackagePolicy::new("crate::model");
        assert!(policy.is_local("crate::model"));
        assert!(!policy.is_local("crate::other"));
        assert!(!policy.is_local("crate::model::nested"));
    }

    #[test]
    fn test_quoted_suffix_is_local() {
        let policy = PackagePolicy::new("crate::model");
        assert!(policy.is_local(&quoted("m", "crate::model")));
        assert!(!policy.is_local(&quoted("m", "other::crate::model")));
        assert!(!policy.is_local("m crate::model\""));
    }

    #[test]
    fn test_canonical_package() {
        assert_eq!(canonical_package("m \"crate::model\""), "crate::model");
        assert_eq!(canonical_package("crate::model"), "crate::model");
    }
}
