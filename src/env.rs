//! # Environment merging for supervised processes.
//!
//! Builds the child environment by overlaying **prefixed** override variables
//! onto a plain environment. A variable named `<PREFIX>_<KEY>` (prefix is the
//! uppercased component name) overrides the plain `<KEY>` for this component
//! only, which lets one inherited environment configure several supervised
//! components independently.
//!
//! `PATH` is special-cased: the output always contains exactly one `PATH`
//! entry, with `<data_dir>/bin` prepended so component-private binaries win
//! path lookup.
//!
//! [`merge_env`] is a pure function over an explicit base mapping. It never
//! reads the ambient process environment; composing the base (inherited
//! variables plus per-spec extras) is the caller's job.
//!
//! ## Example
//! ```
//! use std::collections::HashMap;
//! use std::path::Path;
//! use procvisor::merge_env;
//!
//! let base: HashMap<String, String> = [
//!     ("RUST_LOG".to_string(), "info".to_string()),
//!     ("ETCD_RUST_LOG".to_string(), "debug".to_string()),
//!     ("PATH".to_string(), "/usr/bin".to_string()),
//! ]
//! .into();
//!
//! let merged = merge_env(&base, Path::new("/var/lib/app"), "etcd", false);
//! assert_eq!(merged["RUST_LOG"], "debug");
//! assert_eq!(merged["PATH"], "/var/lib/app/bin:/usr/bin");
//! ```

use std::collections::HashMap;
use std::path::Path;

#[cfg(unix)]
const LIST_SEPARATOR: char = ':';
#[cfg(not(unix))]
const LIST_SEPARATOR: char = ';';

/// Merges prefixed override variables into a base environment.
///
/// Keys are classified as **prefixed** (starting with the uppercased
/// `<component>_` form, matched case-sensitively after uppercasing the
/// component) or **plain**.
///
/// - Plain keys pass through unchanged, except where a prefixed sibling
///   overrides them (see `keep_prefix`).
/// - `PATH` is rebuilt as `<data_dir>/bin` + separator + tail, where the tail
///   is the prefixed `<PREFIX>_PATH` value when `keep_prefix` is false and one
///   exists, and the plain `PATH` value otherwise. When the base has neither,
///   the output `PATH` is just `<data_dir>/bin`.
/// - With `keep_prefix = false`, each prefixed key is consumed: its stripped
///   form is emitted with the prefixed value (replacing the plain sibling, or
///   introducing a new key when no sibling exists) and the prefixed entry
///   itself disappears.
/// - With `keep_prefix = true`, prefixed keys are emitted verbatim alongside
///   the unmodified plain keys.
///
/// Output ordering is irrelevant; duplicate keys are impossible by
/// construction.
pub fn merge_env(
    base: &HashMap<String, String>,
    data_dir: &Path,
    component: &str,
    keep_prefix: bool,
) -> HashMap<String, String> {
    let prefix = format!("{}_", component.to_uppercase());
    let prefixed_path = format!("{prefix}PATH");
    let mut merged = HashMap::with_capacity(base.len() + 1);

    // Prefixed keys first, so the plain pass can tell overridden keys apart.
    for (key, value) in base {
        let Some(stripped) = key.strip_prefix(&prefix) else {
            continue;
        };
        if keep_prefix {
            merged.insert(key.clone(), value.clone());
        } else if stripped != "PATH" {
            merged.insert(stripped.to_string(), value.clone());
        }
    }

    for (key, value) in base {
        if key == "PATH" || key.starts_with(&prefix) {
            continue;
        }
        if keep_prefix {
            merged.insert(key.clone(), value.clone());
        } else {
            // An override emitted above wins over the plain value.
            merged
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    let tail = if keep_prefix {
        base.get("PATH")
    } else {
        base.get(&prefixed_path).or_else(|| base.get("PATH"))
    };
    let mut path = data_dir.join("bin").display().to_string();
    if let Some(tail) = tail {
        path.push(LIST_SEPARATOR);
        path.push_str(tail);
    }
    merged.insert("PATH".to_string(), path);

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base_env() -> HashMap<String, String> {
        env_of(&[
            ("k1", "v1"),
            ("k2", "v2"),
            ("k3", "v3"),
            ("k4", "v4"),
            ("PATH", "/bin"),
            ("HTTPS_PROXY", "1.2.3.4:8888"),
            ("FOO_k2", "foo_v2"),
            ("FOO_k3", "foo_v3"),
            ("FOO_PATH", "/usr/local/bin"),
            ("FOO_HTTPS_PROXY", "a.b.c:1080"),
        ])
    }

    #[test]
    fn test_overrides_replace_plain_keys() {
        let merged = merge_env(&base_env(), Path::new("/var/lib/stack"), "foo", false);
        let expected = env_of(&[
            ("HTTPS_PROXY", "a.b.c:1080"),
            ("PATH", "/var/lib/stack/bin:/usr/local/bin"),
            ("k1", "v1"),
            ("k2", "foo_v2"),
            ("k3", "foo_v3"),
            ("k4", "v4"),
        ]);
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_keep_prefix_retains_prefixed_entries() {
        let merged = merge_env(&base_env(), Path::new("/var/lib/stack"), "foo", true);
        let expected = env_of(&[
            ("FOO_PATH", "/usr/local/bin"),
            ("FOO_k2", "foo_v2"),
            ("FOO_k3", "foo_v3"),
            ("HTTPS_PROXY", "1.2.3.4:8888"),
            ("PATH", "/var/lib/stack/bin:/bin"),
            ("k1", "v1"),
            ("k2", "v2"),
            ("k3", "v3"),
            ("k4", "v4"),
            ("FOO_HTTPS_PROXY", "a.b.c:1080"),
        ]);
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_path_always_present() {
        let merged = merge_env(&env_of(&[("HOME", "/root")]), Path::new("/data"), "foo", false);
        assert_eq!(
            merged["PATH"], "/data/bin",
            "PATH must be synthesized even when the base has none"
        );
        assert_eq!(merged["HOME"], "/root");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_plain_path_used_when_no_prefixed_path() {
        let base = env_of(&[("PATH", "/usr/bin:/bin")]);
        let merged = merge_env(&base, Path::new("/data"), "foo", false);
        assert_eq!(merged["PATH"], "/data/bin:/usr/bin:/bin");
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_override_without_plain_sibling_is_injected() {
        let base = env_of(&[("FOO_DEBUG", "1"), ("PATH", "/bin")]);
        let merged = merge_env(&base, Path::new("/data"), "foo", false);
        assert_eq!(
            merged["DEBUG"], "1",
            "a prefixed key with no plain sibling introduces the stripped key"
        );
        assert!(!merged.contains_key("FOO_DEBUG"));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let base = env_of(&[("foo_k1", "lower"), ("k1", "v1"), ("PATH", "/bin")]);
        let merged = merge_env(&base, Path::new("/data"), "foo", false);
        assert_eq!(merged["k1"], "v1", "lowercase 'foo_' is not the FOO_ prefix");
        assert_eq!(merged["foo_k1"], "lower");
    }

    #[test]
    fn test_prefix_comes_from_uppercased_component() {
        let base = env_of(&[("KUBE-APISERVER_FLAG", "x"), ("PATH", "/bin")]);
        let merged = merge_env(&base, Path::new("/data"), "kube-apiserver", false);
        assert_eq!(merged["FLAG"], "x");
    }

    #[test]
    fn test_empty_plain_path_keeps_separator() {
        let base = env_of(&[("PATH", "")]);
        let merged = merge_env(&base, Path::new("/data"), "foo", false);
        assert_eq!(merged["PATH"], "/data/bin:");
    }
}
