//! The capability seam between traversal and the language analyzer.
//!
//! The re-export traversal consumes exactly two capabilities: resolve a
//! specifier from a file, and fetch a module's parsed surface. Keeping them
//! behind a trait lets tests drive the traversal with in-memory modules and
//! keeps the analyzer injectable.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::resolver::{ModuleResolver, Resolution};
use crate::surface::{collect_module_surface, ModuleSurface};

/// Minimum capability set the traversal needs from a language analyzer.
pub trait ModuleHost {
    /// Resolve a specifier from a file to an absolute path, or `None` when
    /// it does not land on a file.
    fn resolve_abs_path(&self, from_abs: &Path, specifier: &str) -> Option<PathBuf>;

    /// The parsed surface of a module, or `None` when the file cannot be
    /// read or parsed.
    fn module_surface(&self, abs_path: &Path) -> Option<Arc<ModuleSurface>>;
}

/// Filesystem-backed host with a per-call surface cache.
///
/// Surfaces are cached by absolute path, including negative results, so a
/// barrel consulted by many tunnel requests parses once. The cache lives and
/// dies with one `build_graph` invocation.
pub struct AnalysisHost<'a> {
    resolver: &'a ModuleResolver,
    surfaces: RefCell<FxHashMap<PathBuf, Option<Arc<ModuleSurface>>>>,
}

impl<'a> AnalysisHost<'a> {
    pub fn new(resolver: &'a ModuleResolver) -> Self {
        Self {
            resolver,
            surfaces: RefCell::new(FxHashMap::default()),
        }
    }
}

impl ModuleHost for AnalysisHost<'_> {
    fn resolve_abs_path(&self, from_abs: &Path, specifier: &str) -> Option<PathBuf> {
        match self.resolver.resolve(specifier, from_abs) {
            Resolution::File { abs_path, .. } => Some(abs_path),
            _ => None,
        }
    }

    fn module_surface(&self, abs_path: &Path) -> Option<Arc<ModuleSurface>> {
        if let Some(cached) = self.surfaces.borrow().get(abs_path) {
            return cached.clone();
        }
        let surface = std::fs::read_to_string(abs_path)
            .ok()
            .and_then(|text| match collect_module_surface(&text, abs_path) {
                Ok(surface) => Some(Arc::new(surface)),
                Err(err) => {
                    debug!(path = %abs_path.display(), error = %err, "surface parse failed");
                    None
                }
            });
        self.surfaces
            .borrow_mut()
            .insert(abs_path.to_path_buf(), surface.clone());
        surface
    }
}
