//! Locating and opening ROCm shared libraries.

use std::path::PathBuf;

use libloading::Library;
use tracing::{debug, trace};

use crate::error::{HipError, HipResult};

/// Installation root used when `ROCM_PATH` is unset.
pub const DEFAULT_ROCM_ROOT: &str = "/opt/rocm";

/// A shared library and the sonames it may be installed under, most
/// preferred first.
#[derive(Debug, Clone, Copy)]
pub struct LibrarySpec {
    pub name: &'static str,
    pub sonames: &'static [&'static str],
}

pub const HIP_RUNTIME: LibrarySpec = LibrarySpec {
    name: "HIP runtime",
    sonames: &["libamdhip64.so", "libamdhip64.so.6", "libamdhip64.so.5"],
};

pub const ROCBLAS: LibrarySpec = LibrarySpec {
    name: "rocBLAS",
    sonames: &["librocblas.so", "librocblas.so.4", "librocblas.so.3"],
};

/// Where to look for ROCm libraries.
#[derive(Debug, Clone, PartialEq)]
pub struct RocmPaths {
    root: PathBuf,
}

impl Default for RocmPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ROCM_ROOT)
    }
}

impl RocmPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Candidate paths for `target`, in search order.
    ///
    /// Files under `<root>/lib` come first; bare sonames follow so the
    /// system loader can resolve them through `LD_LIBRARY_PATH` and the
    /// ld.so cache.
    pub fn candidates(&self, target: &LibrarySpec) -> Vec<PathBuf> {
        let lib_dir = self.root.join("lib");
        target.sonames
            .iter()
            .map(|soname| lib_dir.join(soname))
            .chain(target.sonames.iter().map(PathBuf::from))
            .collect()
    }

    /// Opens the first candidate for `target` that loads.
    pub fn open(&self, target: &LibrarySpec) -> HipResult<(Library, PathBuf)> {
        let candidates = self.candidates(target);
        let mut reason = String::from("no candidates");

        for candidate in &candidates {
            // SAFETY: loading a ROCm library runs its initializers, which
            // have no preconditions beyond a sane process environment.
            match unsafe { Library::new(candidate) } {
                Ok(lib) => {
                    debug!(library = target.name, path = %candidate.display(), "loaded");
                    return Ok((lib, candidate.clone()));
                }
                Err(e) => {
                    trace!(library = target.name, path = %candidate.display(), error = %e, "load failed");
                    reason = e.to_string();
                }
            }
        }

        Err(HipError::LibraryNotFound {
            library: target.name.to_string(),
            searched: candidates.iter().map(|p| p.display().to_string()).collect(),
            reason,
        })
    }
}
