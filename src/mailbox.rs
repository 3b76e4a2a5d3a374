//! Mailbox names for component ports.
//!
//! Every component exposes four standard mailboxes (`inbox`, `outbox`,
//! `control`, and `signal`) through which exactly one message passes per
//! step. Containers additionally own four internal pass-through mailboxes
//! (`_outboxToChild`, `_signalToChild`, `_inboxFromChild`,
//! `_controlFromChild`) that bridge their own boundary to the wiring of
//! their children. Arbitrary custom names are allowed for application
//! ports such as test taps.
//!
//! # Examples
//!
//! ```rust
//! use wiregraph::mailbox::Mailbox;
//!
//! let inbox: Mailbox = "inbox".into();
//! assert_eq!(inbox, Mailbox::Inbox);
//!
//! let tap: Mailbox = "metricsTap".into();
//! assert!(tap.is_custom());
//! assert_eq!(tap.name(), "metricsTap");
//! ```

use std::fmt;

/// A named port through which a component sends or receives one message
/// per step.
///
/// The standard and pass-through names are dedicated variants so that
/// link validation and the forwarding table can match on them
/// exhaustively; anything else is [`Custom`](Self::Custom).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mailbox {
    /// Standard inbound data port.
    Inbox,
    /// Standard outbound data port.
    Outbox,
    /// Standard inbound control port; shutdown notices arrive here.
    Control,
    /// Standard outbound control port; shutdown notices leave here.
    Signal,
    /// Container-internal: forwards boundary `inbox` traffic to children.
    OutboxToChild,
    /// Container-internal: forwards boundary `control` traffic to children.
    SignalToChild,
    /// Container-internal: receives the last child's `outbox` traffic.
    InboxFromChild,
    /// Container-internal: receives the last child's `signal` traffic.
    ControlFromChild,
    /// Application-defined port name.
    Custom(String),
}

impl Mailbox {
    /// The canonical name of this mailbox.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Inbox => "inbox",
            Self::Outbox => "outbox",
            Self::Control => "control",
            Self::Signal => "signal",
            Self::OutboxToChild => "_outboxToChild",
            Self::SignalToChild => "_signalToChild",
            Self::InboxFromChild => "_inboxFromChild",
            Self::ControlFromChild => "_controlFromChild",
            Self::Custom(name) => name,
        }
    }

    /// Returns `true` if this is an application-defined mailbox name.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Returns `true` if this is one of the four container pass-through
    /// mailboxes.
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        matches!(
            self,
            Self::OutboxToChild
                | Self::SignalToChild
                | Self::InboxFromChild
                | Self::ControlFromChild
        )
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Developer Experience: allow using string literals where a Mailbox is expected.
impl From<&str> for Mailbox {
    fn from(s: &str) -> Self {
        match s {
            "inbox" => Self::Inbox,
            "outbox" => Self::Outbox,
            "control" => Self::Control,
            "signal" => Self::Signal,
            "_outboxToChild" => Self::OutboxToChild,
            "_signalToChild" => Self::SignalToChild,
            "_inboxFromChild" => Self::InboxFromChild,
            "_controlFromChild" => Self::ControlFromChild,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for Mailbox {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_names_round_trip() {
        for name in [
            "inbox",
            "outbox",
            "control",
            "signal",
            "_outboxToChild",
            "_signalToChild",
            "_inboxFromChild",
            "_controlFromChild",
        ] {
            let mailbox = Mailbox::from(name);
            assert!(!mailbox.is_custom());
            assert_eq!(mailbox.name(), name);
        }
    }

    #[test]
    fn custom_names_pass_through() {
        let mailbox = Mailbox::from("loopOut");
        assert!(mailbox.is_custom());
        assert_eq!(mailbox.to_string(), "loopOut");
        // Custom names never alias the dedicated variants.
        assert_ne!(mailbox, Mailbox::Inbox);
    }

    #[test]
    fn pass_through_classification() {
        assert!(Mailbox::OutboxToChild.is_pass_through());
        assert!(!Mailbox::Inbox.is_pass_through());
        assert!(!Mailbox::from("loopOut").is_pass_through());
    }
}
