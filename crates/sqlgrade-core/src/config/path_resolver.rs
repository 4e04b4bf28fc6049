use std::path::{Path, PathBuf};

/// Resolves config-relative paths against the directory holding the config file.
#[derive(Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
}

impl PathResolver {
    pub fn new(config_path: &Path) -> Self {
        let base_dir = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Self { base_dir }
    }

    pub fn resolve(&self, p: &mut PathBuf) {
        if p.as_os_str().is_empty() || p.is_absolute() || is_in_memory(p) {
            return;
        }
        *p = self.join_clean(p);
    }

    fn join_clean(&self, rel: &Path) -> PathBuf {
        let joined = self.base_dir.join(rel);

        let mut out = PathBuf::new();
        for c in joined.components() {
            use std::path::Component::*;
            match c {
                CurDir => {}
                ParentDir => {
                    out.pop();
                }
                RootDir | Prefix(_) | Normal(_) => out.push(c.as_os_str()),
            }
        }
        if out.as_os_str().is_empty() {
            out.push(".");
        }
        out
    }
}

pub fn is_in_memory(p: &Path) -> bool {
    p.as_os_str() == ":memory:"
}
