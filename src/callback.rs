//! Callback Dispatcher
//!
//! Autonomous notifications toward the host, delivered at most once per
//! trigger even when the outbound channel is busy.
//!
//! Each notification kind owns a [`CallbackSlot`]. On every tick an idle
//! slot evaluates its trigger; a triggered payload is composed once and
//! offered to the [`NotificationSink`]. If the sink refuses, the very same
//! payload is retried on the following ticks until it goes through.

use crate::stream::ReadChunk;
use crate::types::ErrorCount;

/// Notification emitted without a host request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A chunk of received data
    ReadLowLevel(ReadChunk),
    /// The receive error counters changed
    ErrorCount(ErrorCount),
    /// This many whole frames are readable
    FrameReadable(u16),
}

#[cfg(feature = "embedded")]
impl defmt::Format for Notification {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::ReadLowLevel(chunk) => defmt::write!(f, "ReadLowLevel({})", chunk),
            Self::ErrorCount(count) => defmt::write!(f, "ErrorCount({})", count),
            Self::FrameReadable(frames) => defmt::write!(f, "FrameReadable({})", frames),
        }
    }
}

/// Non-blocking outbound transport for notifications
pub trait NotificationSink {
    /// Hand over a notification
    ///
    /// # Errors
    ///
    /// Gives the notification back when it cannot be accepted right now.
    fn try_send(&mut self, notification: Notification) -> Result<(), Notification>;
}

#[cfg(feature = "embedded")]
impl<M, const N: usize> NotificationSink for embassy_sync::channel::Sender<'_, M, Notification, N>
where
    M: embassy_sync::blocking_mutex::raw::RawMutex,
{
    fn try_send(&mut self, notification: Notification) -> Result<(), Notification> {
        embassy_sync::channel::Sender::try_send(self, notification).map_err(
            |embassy_sync::channel::TrySendError::Full(notification)| notification,
        )
    }
}

/// Delivery state of one notification kind
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CallbackState {
    /// Nothing pending
    #[default]
    Idle,
    /// Composed but refused by the sink, retried next tick
    Buffered(Notification),
}

/// Offer a composed notification to the sink
///
/// Returns the state the slot ends up in.
pub fn attempt_send<S: NotificationSink>(sink: &mut S, notification: Notification) -> CallbackState {
    match sink.try_send(notification) {
        Ok(()) => CallbackState::Idle,
        Err(notification) => CallbackState::Buffered(notification),
    }
}

/// Per-kind retry slot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackSlot {
    state: CallbackState,
}

impl CallbackSlot {
    /// Create an idle slot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CallbackState::Idle,
        }
    }

    /// Whether a payload is waiting for the sink
    #[must_use]
    pub const fn is_buffered(&self) -> bool {
        matches!(self.state, CallbackState::Buffered(_))
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &CallbackState {
        &self.state
    }

    /// Run one tick for this slot
    ///
    /// `trigger` is only evaluated when nothing is buffered; it composes the
    /// payload and returns None when there is nothing to report. Returns true
    /// when a notification reached the sink.
    pub fn tick<S, F>(&mut self, sink: &mut S, trigger: F) -> bool
    where
        S: NotificationSink,
        F: FnOnce() -> Option<Notification>,
    {
        let notification = match core::mem::take(&mut self.state) {
            CallbackState::Buffered(notification) => notification,
            CallbackState::Idle => match trigger() {
                Some(notification) => notification,
                None => return false,
            },
        };

        self.state = attempt_send(sink, notification);
        if self.is_buffered() {
            trace!("notification deferred, sink busy");
            false
        } else {
            true
        }
    }
}
