//! # Slot configuration.
//!
//! Provides [`SlotConfig`] the settings fixed at slot construction, and [`SlotKind`]
//! the ownership variant.
//!
//! Config is used in two ways:
//! 1. **Slot creation**: `SlotBuilder::new()...build()` resolves unset flags to these defaults
//! 2. **Declaration checks**: [`EventDecl`](crate::EventDecl) compares a slot's config with
//!    what an owner declared

/// How a slot holds bound listeners by default.
///
/// Plain closures are always held strongly. The variant only decides what happens to
/// listeners bound to an owner (methods and handlers).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Bound owners are kept alive for as long as they are subscribed.
    #[default]
    Strong,
    /// Bound owners are referenced weakly; once reclaimed, their listeners are dropped.
    Weak,
}

impl SlotKind {
    /// Returns a short stable label for logs and mismatch reports.
    pub fn as_label(self) -> &'static str {
        match self {
            SlotKind::Strong => "strong",
            SlotKind::Weak => "weak",
        }
    }
}

/// Settings of a single event slot.
///
/// ## Field semantics
/// - `kind`: ownership used by `subscribe` for bound listeners
/// - `propagate_exceptions`: `true` = first listener failure aborts the pass and is returned;
///   `false` = failures are reported to the observer and the pass continues
/// - `allow_duplicate_listeners`: `false` = subscribing an already present identity is an error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotConfig {
    /// Ownership variant.
    pub kind: SlotKind,
    /// Failure policy.
    pub propagate_exceptions: bool,
    /// Subscribe policy.
    pub allow_duplicate_listeners: bool,
}

impl SlotConfig {
    /// Default configuration as a `const`, usable in static declarations.
    pub const DEFAULT: SlotConfig = SlotConfig {
        kind: SlotKind::Strong,
        propagate_exceptions: false,
        allow_duplicate_listeners: false,
    };

    /// True if bound listeners are downgraded on subscribe.
    #[inline]
    pub fn is_weak(&self) -> bool {
        self.kind == SlotKind::Weak
    }
}

impl Default for SlotConfig {
    /// Default configuration:
    ///
    /// - `kind = SlotKind::Strong`
    /// - `propagate_exceptions = false` (failures are logged, never raised)
    /// - `allow_duplicate_listeners = false`
    fn default() -> Self {
        Self::DEFAULT
    }
}
