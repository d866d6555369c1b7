//! Radar orchestrator
//!
//! [`Ld2410s`] ties the frame layer to a transport, a clock and a telemetry
//! sink. Call [`Ld2410s::poll`] once per scheduling tick: it drains every
//! byte the UART has buffered, routes complete frames, expires a stale
//! command and transmits the next queued one when the link is free.

use ld2410s_hal::clock::elapsed_ms;
use ld2410s_hal::{MonotonicClock, UartRx, UartTx};
use ld2410s_protocol::{
    validate, AckPayload, Command, CommandAck, FrameBuffer, FrameError, FrameKind, Opcode,
    PeriodicDecoder, PeriodicReading, RawFrame, TargetState, ValidatedFrame,
};

use crate::config::DriverConfig;
use crate::info::DeviceInfo;
use crate::sequence::{CommandSequence, FailureReason, SequenceStatus};
use crate::sink::{DistanceKind, EnergyKind, TelemetrySink};

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    /// UART write failed
    Transport(E),
    /// Not enough room in the command queue
    QueueFull,
    /// Command could not be encoded
    Frame(FrameError),
}

impl<E> From<FrameError> for DriverError<E> {
    fn from(e: FrameError) -> Self {
        DriverError::Frame(e)
    }
}

/// Command on the wire, waiting for its ack
#[derive(Debug, Clone, Copy)]
struct PendingCommand {
    opcode: Opcode,
    sent_at_ms: u32,
}

/// Last value handed to the sink, per field
#[derive(Debug, Default)]
struct Published {
    target_state: Option<TargetState>,
    moving_distance: Option<i16>,
    moving_energy: Option<u8>,
    still_distance: Option<i16>,
    still_energy: Option<u8>,
    detection_distance: Option<i16>,
}

/// Offer `value` to `deliver` if it differs from `slot`
///
/// `slot` only takes the new value once the sink has accepted it, so a
/// dropped event is offered again with the next reading.
fn offer<T: PartialEq + Copy>(slot: &mut Option<T>, value: T, deliver: impl FnOnce(T) -> bool) {
    if *slot != Some(value) && deliver(value) {
        *slot = Some(value);
    }
}

/// LD2410S radar driver
pub struct Ld2410s<U, C, S> {
    uart: U,
    clock: C,
    sink: Option<S>,
    config: DriverConfig,
    frames: FrameBuffer,
    reports: PeriodicDecoder,
    sequence: CommandSequence,
    pending: Option<PendingCommand>,
    last_tx_ms: Option<u32>,
    config_mode: bool,
    info: DeviceInfo,
    published: Published,
}

impl<U, C, S> Ld2410s<U, C, S>
where
    U: UartRx + UartTx,
    C: MonotonicClock,
    S: TelemetrySink,
{
    /// Create a driver without a telemetry sink
    pub fn new(uart: U, clock: C, config: DriverConfig) -> Self {
        Self {
            uart,
            clock,
            sink: None,
            config,
            frames: FrameBuffer::new(),
            reports: PeriodicDecoder::new(config.throttle_ms),
            sequence: CommandSequence::new(),
            pending: None,
            last_tx_ms: None,
            config_mode: false,
            info: DeviceInfo::default(),
            published: Published::default(),
        }
    }

    /// Attach a telemetry sink
    pub fn with_sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace (or remove) the telemetry sink
    pub fn set_sink(&mut self, sink: Option<S>) {
        self.sink = sink;
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Access the underlying transport
    pub fn transport_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Version and serial number learned so far
    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Progress of the queued command sequence
    pub fn status(&self) -> SequenceStatus {
        self.sequence.status()
    }

    /// True once enable-config was acknowledged and until disable-config is
    pub fn in_config_mode(&self) -> bool {
        self.config_mode
    }

    /// Command awaiting its acknowledgement, if any
    pub fn outstanding(&self) -> Option<Opcode> {
        self.pending.map(|pending| pending.opcode)
    }

    /// True when nothing is queued or in flight
    pub fn is_idle(&self) -> bool {
        self.pending.is_none() && self.sequence.is_empty()
    }

    /// Log the configuration and the last known device info
    pub fn log_config(&self) {
        info!("LD2410S:");
        info!("  Throttle: {} ms", self.config.throttle_ms);
        info!("  Settle: {} ms", self.config.settle_ms);
        match self.config.ack_timeout_ms {
            Some(timeout_ms) => info!("  Ack timeout: {} ms", timeout_ms),
            None => info!("  Ack timeout: disabled"),
        }
        info!("  Firmware version: {}", self.info.version().unwrap_or("unknown"));
        info!("  Serial number: {}", self.info.serial_number().unwrap_or("unknown"));
    }

    /// Log the setup and queue the device info query
    pub fn start(&mut self) -> Result<(), DriverError<U::Error>> {
        info!("Setting up LD2410S");
        self.log_config();
        self.read_all_info()
    }

    /// Queue firmware version and serial number queries in configuration mode
    pub fn read_all_info(&mut self) -> Result<(), DriverError<U::Error>> {
        self.configure(&[Command::get_firmware_version(), Command::get_serial_number()])
    }

    /// Queue `commands` between enable and disable configuration mode
    pub fn configure(&mut self, commands: &[Command]) -> Result<(), DriverError<U::Error>> {
        if !self.sequence.push_configured(commands) {
            warn!(
                "Command queue full, {} commands not queued",
                commands.len()
            );
            return Err(DriverError::QueueFull);
        }
        debug!("Queued {} commands in configuration mode", commands.len());
        Ok(())
    }

    /// Queue a single command without touching configuration mode
    pub fn enqueue(&mut self, command: Command) -> Result<(), DriverError<U::Error>> {
        self.sequence
            .push(command)
            .map_err(|_| DriverError::QueueFull)
    }

    /// Run one scheduling tick
    ///
    /// Drains all buffered input, then handles the ack timeout and the
    /// next transmission. Only transport write failures are returned; bad
    /// frames are logged and dropped.
    pub fn poll(&mut self) -> Result<(), DriverError<U::Error>> {
        let now_ms = self.clock.now_ms();

        while let Some(byte) = self.uart.read_available_byte() {
            match self.frames.feed(byte) {
                Ok(Some(raw)) => self.handle_frame(raw, now_ms),
                Ok(None) => {}
                Err(e) => debug!("Frame buffer reset: {:?}", e),
            }
        }

        self.check_timeout(now_ms);
        self.transmit_next(now_ms)
    }

    fn handle_frame(&mut self, raw: RawFrame, now_ms: u32) {
        let kind = raw.kind();
        match validate(raw) {
            Ok(frame) => match kind {
                FrameKind::Periodic => self.handle_report(&frame, now_ms),
                FrameKind::CommandAck => self.handle_ack(&frame),
            },
            Err(FrameError::CommandFailed { opcode }) => {
                let opcode = Opcode::from_code(opcode);
                error!("Command {:?} failed", opcode);
                self.fail_outstanding(opcode, FailureReason::Rejected);
            }
            Err(e) => match kind {
                FrameKind::Periodic => trace!("Dropping periodic frame: {:?}", e),
                FrameKind::CommandAck => error!("Error with last command: {:?}", e),
            },
        }
    }

    fn handle_report(&mut self, frame: &ValidatedFrame, now_ms: u32) {
        if let Some(reading) = self.reports.decode(frame, now_ms) {
            self.publish(&reading);
        }
    }

    fn publish(&mut self, reading: &PeriodicReading) {
        let published = &mut self.published;
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        offer(&mut published.target_state, reading.target_state, |state| {
            sink.presence_changed(state)
        });
        offer(&mut published.moving_distance, reading.moving_distance, |d| {
            sink.distance_updated(DistanceKind::Moving, d)
        });
        if let Some(energy) = reading.moving_energy {
            offer(&mut published.moving_energy, energy, |e| {
                sink.energy_updated(EnergyKind::Moving, e)
            });
        }
        if let Some(distance) = reading.still_distance {
            offer(&mut published.still_distance, distance, |d| {
                sink.distance_updated(DistanceKind::Still, d)
            });
        }
        if let Some(energy) = reading.still_energy {
            offer(&mut published.still_energy, energy, |e| {
                sink.energy_updated(EnergyKind::Still, e)
            });
        }
        if let Some(distance) = reading.detection_distance {
            offer(&mut published.detection_distance, distance, |d| {
                sink.distance_updated(DistanceKind::Detection, d)
            });
        }
    }

    fn handle_ack(&mut self, frame: &ValidatedFrame) {
        match CommandAck::from_frame(frame) {
            Ok(ack) => {
                debug!("Handling ack for {:?}", ack.opcode);
                let opcode = ack.opcode;
                self.apply_ack(ack);
                self.complete_outstanding(opcode);
            }
            Err(e) => {
                error!("Error with last command: {:?}", e);
                if let Some(code) = frame.opcode() {
                    self.fail_outstanding(Opcode::from_code(code), FailureReason::Malformed);
                }
            }
        }
    }

    /// Update device state from a successful ack, correlated or not
    fn apply_ack(&mut self, ack: CommandAck) {
        match ack.payload {
            AckPayload::FirmwareVersion(version) => {
                let text = version.to_text();
                debug!("Firmware version: {}", text.as_str());
                if let Some(sink) = self.sink.as_mut() {
                    sink.version_known(&text);
                }
                self.info.set_version(text);
            }
            AckPayload::SerialNumber(serial) => {
                debug!("Serial number: {}", serial.as_str());
                if let Some(sink) = self.sink.as_mut() {
                    sink.serial_number_known(&serial);
                }
                self.info.set_serial_number(serial);
            }
            AckPayload::None => {}
        }

        match ack.opcode {
            Opcode::EnableConfig => {
                self.config_mode = true;
                self.ensure_exit_queued();
            }
            Opcode::DisableConfig => self.config_mode = false,
            _ => {}
        }
    }

    /// Queue a disable-config after an enable-config ack nothing asked for
    ///
    /// Covers a late ack for an enable-config that already timed out, so the
    /// radar does not stay in configuration mode.
    fn ensure_exit_queued(&mut self) {
        let outstanding = self.pending.map(|pending| pending.opcode);
        if matches!(outstanding, Some(Opcode::EnableConfig | Opcode::DisableConfig))
            || self.sequence.has_exit_queued()
        {
            return;
        }
        warn!("Radar entered configuration mode unasked, queueing disable-config");
        if !self.sequence.push_exit() {
            error!("Command queue full, radar left in configuration mode");
        }
    }

    fn complete_outstanding(&mut self, acked: Opcode) {
        let pending = self.pending;
        match pending {
            Some(pending) if pending.opcode.is_acked_by(acked) => {
                self.pending = None;
                self.sequence.step_done();
            }
            Some(pending) => warn!(
                "Ack for {:?} while waiting for {:?}",
                acked,
                pending.opcode
            ),
            None => warn!("Unsolicited ack for {:?}", acked),
        }
    }

    fn fail_outstanding(&mut self, failed: Opcode, reason: FailureReason) {
        let pending = self.pending;
        match pending {
            Some(pending) if pending.opcode.is_acked_by(failed) => {
                self.pending = None;
                self.sequence
                    .fail(pending.opcode, reason, self.config_mode);
            }
            _ => warn!("Failure for {:?} matches no outstanding command", failed),
        }
    }

    fn check_timeout(&mut self, now_ms: u32) {
        let (Some(pending), Some(timeout_ms)) = (self.pending, self.config.ack_timeout_ms) else {
            return;
        };
        if elapsed_ms(now_ms, pending.sent_at_ms) >= timeout_ms {
            warn!("No ack for {:?} after {} ms", pending.opcode, timeout_ms);
            self.pending = None;
            // The radar may have switched without answering
            let keep_exit = self.config_mode || pending.opcode == Opcode::EnableConfig;
            self.sequence
                .fail(pending.opcode, FailureReason::Timeout, keep_exit);
        }
    }

    fn transmit_next(&mut self, now_ms: u32) -> Result<(), DriverError<U::Error>> {
        if self.pending.is_some() {
            return Ok(());
        }
        if let Some(last_tx_ms) = self.last_tx_ms {
            if elapsed_ms(now_ms, last_tx_ms) < self.config.settle_ms {
                return Ok(());
            }
        }
        let Some(command) = self.sequence.next_command() else {
            return Ok(());
        };

        let opcode = command.opcode;
        if opcode.requires_config_mode() && !self.config_mode {
            warn!("Sending {:?} outside configuration mode", opcode);
        }

        let frame = match command.encode_to_vec() {
            Ok(frame) => frame,
            Err(e) => {
                self.sequence
                    .fail(opcode, FailureReason::Transport, self.config_mode);
                return Err(e.into());
            }
        };

        trace!("Sending {:?} ({} bytes)", opcode, frame.len());
        self.last_tx_ms = Some(now_ms);
        let written = self.uart.write_bytes(&frame).and_then(|()| self.uart.flush());
        if let Err(e) = written {
            self.sequence
                .fail(opcode, FailureReason::Transport, self.config_mode);
            return Err(DriverError::Transport(e));
        }

        self.pending = Some(PendingCommand {
            opcode,
            sent_at_ms: now_ms,
        });
        Ok(())
    }
}
