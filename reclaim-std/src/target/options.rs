//! Listener registration options.

use bitflags::bitflags;

bitflags! {
    /// Flags of the object form of [`ListenerOptions`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ListenerFlags: u8 {
        /// Register for the capture phase.
        const CAPTURE = 1;
        /// Remove the listener before its first invocation.
        const ONCE = 1 << 1;
        /// The listener promises not to cancel the event.
        const PASSIVE = 1 << 2;
    }
}

/// How a listener is registered.
///
/// Two option values are equivalent for registration identity when their
/// effective capture flag matches; `once` and `passive` do not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerOptions {
    /// The boolean form: only a capture flag.
    Capture(bool),
    /// The object form: a set of flags.
    Flags(ListenerFlags),
}

impl ListenerOptions {
    /// The effective capture flag.
    pub fn capture(&self) -> bool {
        match self {
            Self::Capture(capture) => *capture,
            Self::Flags(flags) => flags.contains(ListenerFlags::CAPTURE),
        }
    }

    /// Whether the listener is one-shot. Only the object form can say so.
    pub fn once(&self) -> bool {
        matches!(self, Self::Flags(flags) if flags.contains(ListenerFlags::ONCE))
    }

    /// Whether the listener is passive.
    pub fn passive(&self) -> bool {
        matches!(self, Self::Flags(flags) if flags.contains(ListenerFlags::PASSIVE))
    }

    /// Whether both options identify the same registration slot.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.capture() == other.capture()
    }
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self::Capture(false)
    }
}

impl From<bool> for ListenerOptions {
    fn from(capture: bool) -> Self {
        Self::Capture(capture)
    }
}

impl From<ListenerFlags> for ListenerOptions {
    fn from(flags: ListenerFlags) -> Self {
        Self::Flags(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalence_ignores_once_and_passive() {
        let plain = ListenerOptions::default();
        let object = ListenerOptions::from(ListenerFlags::ONCE | ListenerFlags::PASSIVE);
        assert!(plain.is_equivalent(&object));
        assert!(plain.is_equivalent(&ListenerOptions::Capture(false)));
        assert!(!plain.is_equivalent(&ListenerOptions::Capture(true)));
        assert!(ListenerOptions::Capture(true).is_equivalent(&ListenerFlags::CAPTURE.into()));
    }

    #[test]
    fn test_once_only_from_object_form() {
        assert!(ListenerOptions::from(ListenerFlags::ONCE).once());
        assert!(!ListenerOptions::Capture(true).once());
        assert!(ListenerOptions::from(ListenerFlags::PASSIVE).passive());
    }
}
