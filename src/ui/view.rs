//! Observable state exposed to the rendering layer

use crate::models::UnifiedOtpService;
use crate::state::{HaltReason, SyncPhase};
use serde::Serialize;

/// The `(phase, services)` pair the renderer subscribes to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncView {
    pub phase: SyncPhase,
    services: Vec<UnifiedOtpService>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halt: Option<HaltReason>,
}

impl Default for SyncView {
    fn default() -> Self {
        Self::loading(SyncPhase::SessionCheck, None)
    }
}

impl SyncView {
    /// A view that must render the placeholder
    pub fn loading(phase: SyncPhase, halt: Option<HaltReason>) -> Self {
        Self {
            phase,
            services: Vec::new(),
            halt,
        }
    }

    pub fn ready(services: Vec<UnifiedOtpService>) -> Self {
        Self {
            phase: SyncPhase::Ready,
            services,
            halt: None,
        }
    }

    pub fn renders_content(&self) -> bool {
        self.phase == SyncPhase::Ready
    }

    /// Services to render; `None` unless the phase is `Ready`
    pub fn content(&self) -> Option<&[UnifiedOtpService]> {
        self.renders_content().then_some(self.services.as_slice())
    }
}
