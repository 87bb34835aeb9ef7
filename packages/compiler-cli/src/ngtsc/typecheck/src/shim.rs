// TypeCheck Shims
//
// Naming of type-checking shim files.

use once_cell::sync::Lazy;
use regex::Regex;

static TS_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.tsx?$").expect("static pattern is valid"));

const SHIM_EXTENSION: &str = ".ngtypecheck.ts";

/// Path of the shim holding the type-check blocks of `sf_path`: `/app/cmp.ts` becomes
/// `/app/cmp.ngtypecheck.ts`.
pub fn type_check_shim_path(sf_path: &str) -> String {
    if TS_EXTENSION.is_match(sf_path) {
        TS_EXTENSION.replace(sf_path, SHIM_EXTENSION).into_owned()
    } else {
        format!("{}{}", sf_path, SHIM_EXTENSION)
    }
}

pub fn is_shim_path(path: &str) -> bool {
    path.ends_with(SHIM_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shim_path_replaces_extension() {
        assert_eq!(type_check_shim_path("/app/cmp.ts"), "/app/cmp.ngtypecheck.ts");
        assert_eq!(type_check_shim_path("/app/cmp.tsx"), "/app/cmp.ngtypecheck.ts");
        assert!(is_shim_path(&type_check_shim_path("/app/cmp.ts")));
        assert!(!is_shim_path("/app/cmp.ts"));
    }
}
