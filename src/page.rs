//! Which kind of page the overlay accompanies.

/// Landing pages play the build-up animation; every other page shows the
/// finished skyline straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Landing,
    Other,
}

const LANDING_PATHS: [&str; 3] = ["/", "/home", "/home/index"];

impl PageKind {
    /// Classifies a request path. Matching is exact and ignores ASCII case.
    pub fn from_path(path: &str) -> Self {
        if LANDING_PATHS
            .iter()
            .any(|landing| landing.eq_ignore_ascii_case(path))
        {
            PageKind::Landing
        } else {
            PageKind::Other
        }
    }

    pub fn is_landing(self) -> bool {
        self == PageKind::Landing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_paths() {
        for path in ["/", "/home", "/HOME", "/Home/Index", "/home/index"] {
            assert_eq!(PageKind::from_path(path), PageKind::Landing, "{path}");
        }
    }

    #[test]
    fn test_other_paths() {
        for path in ["", "/about", "/home/", "/home/index/", "/homes", "home"] {
            assert_eq!(PageKind::from_path(path), PageKind::Other, "{path}");
        }
    }
}
