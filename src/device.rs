//! RS232 Device
//!
//! The top-level driver instance. Owns the transport, the read stream, the
//! notification slots and the current configuration, and exposes the
//! operations the host protocol maps onto.
//!
//! Two entry points are driven from outside:
//! - [`Rs232::handle_event`] from the UART interrupt context
//! - [`Rs232::tick`] from the cooperative 1 ms tick

use crate::callback::{CallbackSlot, Notification, NotificationSink};
use crate::stream::{write_chunk, FrameReadable, ReadChunk, ReadStreamStatus};
use crate::types::{BufferSplit, BufferStatus, ConfigError, ErrorCount, LineConfig};
use crate::uart::{Transport, UartEvent, UartHardware};

/// RS232 bridge driver state
pub struct Rs232<H: UartHardware> {
    transport: Transport<H>,
    config: LineConfig,
    read_stream: ReadStreamStatus,
    read_callback_enabled: bool,
    frame_readable: FrameReadable,
    /// Counter values seen by the last tick
    errors_seen: ErrorCount,
    /// Counter values carried by the last error notification
    errors_reported: ErrorCount,
    read_slot: CallbackSlot,
    error_slot: CallbackSlot,
    frame_slot: CallbackSlot,
}

impl<H: UartHardware> Rs232<H> {
    /// Create the driver with the power-up configuration
    pub fn new(hw: H) -> Self {
        Self::with_config(hw, LineConfig::default(), BufferSplit::default())
    }

    /// Create the driver with a specific configuration
    pub fn with_config(hw: H, config: LineConfig, split: BufferSplit) -> Self {
        info!("rs232: init {} / {}", config, split);
        Self {
            transport: Transport::new(hw, &config, split),
            config,
            read_stream: ReadStreamStatus::new(),
            read_callback_enabled: false,
            frame_readable: FrameReadable::new(),
            errors_seen: ErrorCount::default(),
            errors_reported: ErrorCount::default(),
            read_slot: CallbackSlot::new(),
            error_slot: CallbackSlot::new(),
            frame_slot: CallbackSlot::new(),
        }
    }

    // ------------------------------------------------------------------
    // Execution contexts
    // ------------------------------------------------------------------

    /// Deliver a UART interrupt
    pub fn handle_event(&mut self, event: UartEvent) {
        self.transport.handle_event(event);
    }

    /// Periodic work: transport housekeeping and notification dispatch
    pub fn tick<S: NotificationSink>(&mut self, sink: &mut S) {
        self.transport.tick();

        self.errors_seen = self.transport.error_count();

        let rx_used = self.transport.buffers().rx_used();
        self.frame_readable.refresh(rx_used);

        let read_enabled = self.read_callback_enabled;
        let read_stream = &mut self.read_stream;
        let buffers = self.transport.buffers_mut();
        self.read_slot.tick(sink, || {
            if !read_enabled {
                return None;
            }
            read_stream
                .next_chunk(&mut buffers.rx(), u16::MAX)
                .map(Notification::ReadLowLevel)
        });

        let seen = self.errors_seen;
        let reported = &mut self.errors_reported;
        self.error_slot.tick(sink, || {
            if seen == *reported {
                return None;
            }
            *reported = seen;
            Some(Notification::ErrorCount(seen))
        });

        let rx_used = self.transport.buffers().rx_used();
        let frame_readable = &mut self.frame_readable;
        self.frame_slot.tick(sink, || {
            frame_readable.check(rx_used).map(Notification::FrameReadable)
        });
    }

    // ------------------------------------------------------------------
    // Streaming
    // ------------------------------------------------------------------

    /// Accept one chunk of a logical write message
    ///
    /// Returns how many bytes went into the TX ring; the caller resends the
    /// rest in a later chunk.
    pub fn write(&mut self, chunk: &[u8], message_length: u16, chunk_offset: u16) -> u8 {
        let accepted = write_chunk(
            &mut self.transport.buffers_mut().tx(),
            chunk,
            message_length,
            chunk_offset,
        );
        if accepted > 0 {
            self.transport.kick_tx();
        }
        accepted
    }

    /// Poll the next chunk of received data
    ///
    /// Inert while read notifications are enabled. Returns an empty chunk
    /// when nothing is buffered.
    pub fn read(&mut self, requested_length: u16) -> ReadChunk {
        if self.read_callback_enabled {
            return ReadChunk::empty();
        }

        let chunk = self
            .read_stream
            .next_chunk(&mut self.transport.buffers_mut().rx(), requested_length)
            .unwrap_or_else(ReadChunk::empty);

        // Re-arm here too: bytes may refill the ring before the next tick.
        self.frame_readable
            .refresh(self.transport.buffers().rx_used());
        chunk
    }

    /// Push received data to the host every tick
    ///
    /// Disables the frame-readable notification.
    pub fn enable_read_notification(&mut self) {
        self.read_callback_enabled = true;
        self.frame_readable.set_frame_size(0);
    }

    /// Stop pushing received data; pull reads become valid again
    pub fn disable_read_notification(&mut self) {
        self.read_callback_enabled = false;
    }

    /// Whether received data is pushed
    #[must_use]
    pub const fn is_read_notification_enabled(&self) -> bool {
        self.read_callback_enabled
    }

    /// Notify when `frame_size` bytes are readable (0 disables)
    ///
    /// A non-zero size disables the read notification.
    pub fn set_frame_readable_threshold(&mut self, frame_size: u16) {
        self.frame_readable.set_frame_size(frame_size);
        if frame_size > 0 {
            self.read_callback_enabled = false;
        }
    }

    /// Configured frame size for the frame-readable notification
    #[must_use]
    pub const fn frame_readable_threshold(&self) -> u16 {
        self.frame_readable.frame_size()
    }

    /// Hold the TX line in break for `break_time_ms`
    pub fn set_break_condition(&mut self, break_time_ms: u16) {
        self.transport.start_break(break_time_ms);
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Validate and apply line parameters given as protocol values
    ///
    /// # Errors
    ///
    /// Nothing changes when any parameter is out of range.
    pub fn set_line_config(
        &mut self,
        baud_rate: u32,
        parity: u8,
        stop_bits: u8,
        word_length: u8,
        flow_control: u8,
    ) -> Result<(), ConfigError> {
        let config = LineConfig::from_raw(baud_rate, parity, stop_bits, word_length, flow_control)
            .inspect_err(|err| warn!("rs232: rejected line config: {}", err))?;
        self.apply(config, self.transport.buffers().split());
        Ok(())
    }

    /// Current line parameters
    #[must_use]
    pub const fn line_config(&self) -> LineConfig {
        self.config
    }

    /// Validate and apply a new RX/TX split of the buffer arena
    ///
    /// # Errors
    ///
    /// Nothing changes when the split is invalid.
    pub fn set_buffer_split(&mut self, rx_size: u16, tx_size: u16) -> Result<(), ConfigError> {
        let split = BufferSplit::new(rx_size, tx_size)
            .inspect_err(|err| warn!("rs232: rejected buffer split: {}", err))?;
        self.apply(self.config, split);
        Ok(())
    }

    /// Current RX/TX split
    #[must_use]
    pub const fn buffer_split(&self) -> BufferSplit {
        self.transport.buffers().split()
    }

    /// Bytes waiting in each ring
    #[must_use]
    pub fn buffer_occupancy(&self) -> BufferStatus {
        let buffers = self.transport.buffers();
        BufferStatus {
            rx_used: u16::try_from(buffers.rx_used()).unwrap_or(u16::MAX),
            tx_used: u16::try_from(buffers.tx_used()).unwrap_or(u16::MAX),
        }
    }

    /// Receive error counters
    #[must_use]
    pub fn error_counters(&self) -> ErrorCount {
        self.transport.error_count()
    }

    /// Current read stream progress
    #[must_use]
    pub const fn read_stream(&self) -> &ReadStreamStatus {
        &self.read_stream
    }

    /// Underlying transport
    #[must_use]
    pub const fn transport(&self) -> &Transport<H> {
        &self.transport
    }

    /// Mutable underlying transport
    pub fn transport_mut(&mut self) -> &mut Transport<H> {
        &mut self.transport
    }

    fn apply(&mut self, config: LineConfig, split: BufferSplit) {
        info!("rs232: apply {} / {}", config, split);
        self.config = config;
        self.transport.apply_configuration(&config, split);

        // Buffers were wiped, any stream or latch refers to bytes that are gone.
        self.read_stream.reset();
        self.frame_readable.reset();
    }
}
