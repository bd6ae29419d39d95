//! External parameters
//!
//! The external phase reads caller-supplied values through [`ParamSource`].
//! Keys are matched literally against a placeholder's whole trimmed
//! reference, so `{{db.host}}` looks up the key `"db.host"`.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::IndexMap;

/// Ordered parameter set, the default way to pass external values
pub type Params = IndexMap<String, String>;

/// A flat source of external parameter values
pub trait ParamSource {
    /// Value for `key`, if supplied
    fn get_param(&self, key: &str) -> Option<&str>;

    /// Number of parameters supplied
    fn param_count(&self) -> usize;

    /// True when no parameters were supplied
    fn is_empty(&self) -> bool {
        self.param_count() == 0
    }
}

impl<S: BuildHasher> ParamSource for IndexMap<String, String, S> {
    fn get_param(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn param_count(&self) -> usize {
        self.len()
    }
}

impl<S: BuildHasher> ParamSource for HashMap<String, String, S> {
    fn get_param(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn param_count(&self) -> usize {
        self.len()
    }
}

impl ParamSource for BTreeMap<String, String> {
    fn get_param(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn param_count(&self) -> usize {
        self.len()
    }
}

impl<T: ParamSource + ?Sized> ParamSource for &T {
    fn get_param(&self, key: &str) -> Option<&str> {
        (**self).get_param(key)
    }

    fn param_count(&self) -> usize {
        (**self).param_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_all<P: ParamSource>(params: P) -> (Option<String>, Option<String>, usize) {
        (
            params.get_param("user").map(str::to_owned),
            params.get_param("missing").map(str::to_owned),
            params.param_count(),
        )
    }

    #[test]
    fn test_map_types_agree() {
        let pairs = [("user".to_string(), "john".to_string())];
        let expected = (Some("john".to_string()), None, 1);

        assert_eq!(lookup_all(pairs.iter().cloned().collect::<Params>()), expected);
        assert_eq!(
            lookup_all(pairs.iter().cloned().collect::<HashMap<_, _>>()),
            expected
        );
        assert_eq!(
            lookup_all(pairs.iter().cloned().collect::<BTreeMap<_, _>>()),
            expected
        );
    }

    #[test]
    fn test_empty_and_by_reference() {
        let params = Params::new();
        assert!(ParamSource::is_empty(&params));
        assert!(ParamSource::is_empty(&&params));
        assert_eq!(lookup_all(&params), (None, None, 0));
    }
}
