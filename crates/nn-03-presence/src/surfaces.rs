//! The set of presentation surfaces this process drives.
//!
//! Resolved once from the host at startup. Every surface is independently
//! fallible: a failure on one is logged and the rest still run.

use crate::config::ApplyConfig;
use nick_types::{HostContext, Identity, PresentationSurface};
use nn_01_text_codec::to_native;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Default)]
pub struct SurfaceSet {
    surfaces: Vec<Arc<dyn PresentationSurface>>,
}

impl SurfaceSet {
    pub fn resolve(host: &dyn HostContext, apply: &ApplyConfig) -> Self {
        let surfaces: Vec<_> = host
            .available_surfaces()
            .into_iter()
            .filter(|s| apply.enables(s.kind()))
            .collect();

        debug!(
            surfaces = ?surfaces.iter().map(|s| s.kind().as_str()).collect::<Vec<_>>(),
            "Resolved presentation surfaces"
        );
        Self { surfaces }
    }

    pub fn from_surfaces(surfaces: Vec<Arc<dyn PresentationSurface>>) -> Self {
        Self { surfaces }
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Render `raw` through every surface. Returns how many surfaces failed.
    ///
    /// Values go out in native spelling; a surface that refuses that gets one
    /// retry with the raw string.
    pub fn present(&self, identity: Identity, raw: &str) -> usize {
        let native = to_native(raw);
        let mut failures = 0;

        for surface in &self.surfaces {
            let kind = surface.kind().as_str();
            let Err(first) = surface.present(identity, &native) else {
                continue;
            };
            if native == raw {
                warn!(%identity, surface = kind, error = %first, "Presenting name failed");
                failures += 1;
                continue;
            }
            if let Err(e) = surface.present(identity, raw) {
                warn!(%identity, surface = kind, error = %e, "Presenting name failed after raw retry");
                failures += 1;
            }
        }
        failures
    }

    /// Whether any observable surface shows something other than `desired_raw`.
    ///
    /// Comparison is exact, so a color or case change is drift. Both the
    /// native and the raw spelling count as correct, since a surface may hold
    /// either after `present`. A surface that errors on read counts as
    /// drifted; one that cannot be read back does not.
    pub fn drifted(&self, identity: Identity, desired_raw: &str) -> bool {
        let native = to_native(desired_raw);
        self.surfaces.iter().any(|surface| match surface.current(identity) {
            Ok(Some(shown)) => shown != native && shown != desired_raw,
            Ok(None) => false,
            Err(e) => {
                debug!(%identity, surface = surface.kind().as_str(), error = %e, "Surface read failed");
                true
            }
        })
    }
}
