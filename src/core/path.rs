use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

static VAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid variable pattern")
});

pub fn resolve_path(base_dir: &Path, configured: impl AsRef<Path>) -> PathBuf {
    let path = configured.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Expand `$NAME`, `${NAME}` and a leading `~` against `env`.
///
/// Values are spliced in as raw OS strings, so non-UTF-8 values survive.
/// Unset variables expand to the empty string, as in a POSIX shell.
pub fn expand_vars(template: &str, env: &BTreeMap<OsString, OsString>) -> OsString {
    let lookup = |name: &str| -> &OsStr {
        env.get(OsStr::new(name))
            .map(OsString::as_os_str)
            .unwrap_or_default()
    };

    let mut expanded = OsString::new();
    let rest = match template.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            expanded.push(lookup("HOME"));
            rest
        }
        _ => template,
    };

    let mut last = 0;
    for caps in VAR_PATTERN.captures_iter(rest) {
        let Some(whole) = caps.get(0) else { continue };
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();

        expanded.push(&rest[last..whole.start()]);
        expanded.push(lookup(name));
        last = whole.end();
    }
    expanded.push(&rest[last..]);

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<OsString, OsString> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn expands_braced_and_bare_vars() {
        let env = env(&[("USER", "alice")]);
        assert_eq!(
            expand_vars("/Users/${USER}/Desktop/sounding_app", &env),
            OsString::from("/Users/alice/Desktop/sounding_app")
        );
        assert_eq!(
            expand_vars("/home/$USER/app", &env),
            OsString::from("/home/alice/app")
        );
    }

    #[test]
    fn unset_var_expands_to_empty() {
        assert_eq!(
            expand_vars("/Users/${USER}/Desktop", &BTreeMap::new()),
            OsString::from("/Users//Desktop")
        );
    }

    #[test]
    fn tilde_only_at_start() {
        let env = env(&[("HOME", "/home/bob")]);
        assert_eq!(
            expand_vars("~/sounding_app", &env),
            OsString::from("/home/bob/sounding_app")
        );
        assert_eq!(expand_vars("~", &env), OsString::from("/home/bob"));
        assert_eq!(expand_vars("/tmp/~x", &env), OsString::from("/tmp/~x"));
        assert_eq!(expand_vars("~other/x", &env), OsString::from("~other/x"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_values_are_kept_byte_for_byte() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let mut env = BTreeMap::new();
        env.insert(
            OsString::from("USER"),
            OsString::from_vec(b"caf\xe9".to_vec()),
        );

        let expanded = expand_vars("/Users/${USER}/Desktop", &env);
        assert_eq!(expanded.as_bytes(), b"/Users/caf\xe9/Desktop");
    }

    #[test]
    fn resolve_relative_against_base() {
        let base = Path::new("/srv");
        assert_eq!(resolve_path(base, "app"), PathBuf::from("/srv/app"));
        assert_eq!(resolve_path(base, "/opt/app"), PathBuf::from("/opt/app"));
    }
}
