//! Overlay panel identities and visibility bookkeeping

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Every overlay panel the viewer knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Title + field list of the focused object
    Details,
    /// Crane throughput figures
    Analytics,
    /// Banner shown while following a vehicle
    Tracking,
    /// Fault summary for warning/critical equipment
    Diagnostic,
    /// Vehicle dwell-time figures
    Dwell,
    /// Trend graph
    Graph,
    /// Flashing alert strip
    Alert,
    /// Scene-wide energy grid readout
    EnergyGrid,
}

impl OverlayKind {
    /// Overlays a focus may open; all of them close on unfocus
    pub const FOCUS_OVERLAYS: [OverlayKind; 6] = [
        OverlayKind::Details,
        OverlayKind::Analytics,
        OverlayKind::Diagnostic,
        OverlayKind::Dwell,
        OverlayKind::Graph,
        OverlayKind::Alert,
    ];

    /// Overlays every scene provides
    pub const BASELINE: [OverlayKind; 2] = [OverlayKind::Details, OverlayKind::Tracking];

    pub fn title(self) -> &'static str {
        match self {
            OverlayKind::Details => "Details",
            OverlayKind::Analytics => "Crane Analytics",
            OverlayKind::Tracking => "Traffic Analytics",
            OverlayKind::Diagnostic => "Diagnostics",
            OverlayKind::Dwell => "Dwell Time",
            OverlayKind::Graph => "Trend",
            OverlayKind::Alert => "Alert",
            OverlayKind::EnergyGrid => "Energy Grid",
        }
    }
}

/// Which overlays the current scene provides and which are showing
///
/// Showing an overlay the scene does not provide is a soft miss: it is
/// logged and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayBoard {
    available: BTreeSet<OverlayKind>,
    visible: BTreeSet<OverlayKind>,
}

impl OverlayBoard {
    pub fn new(available: impl IntoIterator<Item = OverlayKind>) -> Self {
        let mut available: BTreeSet<OverlayKind> = available.into_iter().collect();
        available.extend(OverlayKind::BASELINE);
        Self {
            available,
            visible: BTreeSet::new(),
        }
    }

    /// Show an overlay; returns false if the scene does not provide it
    pub fn show(&mut self, kind: OverlayKind) -> bool {
        if !self.available.contains(&kind) {
            tracing::debug!(?kind, "Overlay not provided by this scene, skipping");
            return false;
        }
        self.visible.insert(kind);
        true
    }

    pub fn hide(&mut self, kind: OverlayKind) {
        self.visible.remove(&kind);
    }

    pub fn set(&mut self, kind: OverlayKind, visible: bool) {
        if visible {
            self.show(kind);
        } else {
            self.hide(kind);
        }
    }

    pub fn hide_all(&mut self) {
        self.visible.clear();
    }

    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.visible.contains(&kind)
    }

    pub fn provides(&self, kind: OverlayKind) -> bool {
        self.available.contains(&kind)
    }

    pub fn visible(&self) -> impl Iterator<Item = OverlayKind> + '_ {
        self.visible.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_always_available() {
        let board = OverlayBoard::new([]);
        assert!(board.provides(OverlayKind::Details));
        assert!(board.provides(OverlayKind::Tracking));
        assert!(!board.provides(OverlayKind::EnergyGrid));
    }

    #[test]
    fn test_missing_overlay_is_soft_miss() {
        let mut board = OverlayBoard::new([OverlayKind::Analytics]);
        assert!(!board.show(OverlayKind::Diagnostic));
        assert!(!board.is_visible(OverlayKind::Diagnostic));

        assert!(board.show(OverlayKind::Analytics));
        assert!(board.is_visible(OverlayKind::Analytics));

        board.set(OverlayKind::Analytics, false);
        assert_eq!(board.visible().count(), 0);
    }
}
