use datalayer_rpc::StoreId;
use std::fmt;

/// A mount path resolved into the root → store → key hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FsPath {
    /// `/`
    Root,
    /// `/<store>`
    Store(StoreId),
    /// `/<store>/<key name>`
    Key(StoreId, String),
    /// Anything deeper, relative, or with empty components.
    Invalid,
}

impl FsPath {
    /// Resolve an absolute, slash-separated path.
    ///
    /// A single trailing slash is tolerated. Never fails; unusable paths
    /// resolve to [`FsPath::Invalid`].
    pub fn resolve(path: &str) -> Self {
        let Some(rest) = path.strip_prefix('/') else {
            return FsPath::Invalid;
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return FsPath::Root;
        }

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return FsPath::Invalid;
        }

        match segments.as_slice() {
            [store] => FsPath::Store(StoreId::from(*store)),
            [store, key] => FsPath::Key(StoreId::from(*store), (*key).to_string()),
            _ => FsPath::Invalid,
        }
    }

    /// Append a child name, as the kernel does during lookup.
    pub fn child(&self, name: &str) -> Self {
        match self {
            FsPath::Root => FsPath::Store(StoreId::from(name)),
            FsPath::Store(store) => FsPath::Key(store.clone(), name.to_string()),
            FsPath::Key(..) | FsPath::Invalid => FsPath::Invalid,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FsPath::Root | FsPath::Store(_))
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsPath::Root => write!(f, "/"),
            FsPath::Store(store) => write!(f, "/{}", store),
            FsPath::Key(store, key) => write!(f, "/{}/{}", store, key),
            FsPath::Invalid => write!(f, "<invalid>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_three_levels() {
        assert_eq!(FsPath::resolve("/"), FsPath::Root);
        assert_eq!(FsPath::resolve("/storeA"), FsPath::Store("storeA".into()));
        assert_eq!(
            FsPath::resolve("/storeA/key"),
            FsPath::Key("storeA".into(), "key".to_string())
        );
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        assert_eq!(FsPath::resolve("/storeA/"), FsPath::Store("storeA".into()));
    }

    #[test]
    fn malformed_paths_are_invalid() {
        assert_eq!(FsPath::resolve("/a/b/c"), FsPath::Invalid);
        assert_eq!(FsPath::resolve(""), FsPath::Invalid);
        assert_eq!(FsPath::resolve("storeA"), FsPath::Invalid);
        assert_eq!(FsPath::resolve("//key"), FsPath::Invalid);
        assert_eq!(FsPath::resolve("/a//b"), FsPath::Invalid);
    }

    #[test]
    fn child_descends_one_level() {
        let store = FsPath::Root.child("storeA");
        assert_eq!(store, FsPath::Store("storeA".into()));
        let key = store.child("key");
        assert_eq!(key.to_string(), "/storeA/key");
        assert_eq!(key.child("deeper"), FsPath::Invalid);
    }

    #[test]
    fn display_round_trips() {
        for path in ["/", "/storeA", "/storeA/key"] {
            assert_eq!(FsPath::resolve(path).to_string(), path);
        }
    }
}
