//! Command queue and sequence bookkeeping
//!
//! Commands wait here until the driver is allowed to transmit. A sequence
//! queued through [`CommandSequence::push_configured`] is bracketed by
//! enable/disable configuration mode. When a step of a bracket fails, the
//! rest of that bracket is dropped, except its disable-configuration step
//! when the radar may be in configuration mode, so it is never left there.
//! Brackets queued behind it are untouched.

use heapless::Deque;

use ld2410s_protocol::{Command, Opcode};

/// Commands the queue can hold
pub const QUEUE_CAPACITY: usize = 8;

/// Why a command sequence was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureReason {
    /// Radar answered with a failure status
    Rejected,
    /// Ack arrived but its payload could not be decoded
    Malformed,
    /// No ack within the configured timeout
    Timeout,
    /// The command could not be written to the UART
    Transport,
}

/// Progress of the queued commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceStatus {
    /// Nothing queued since start-up
    Idle,
    /// Commands queued or awaiting acknowledgement
    Running,
    /// Every queued command was acknowledged
    Completed,
    /// A command failed and the sequence was aborted
    Failed { opcode: Opcode, reason: FailureReason },
}

/// Place of a queued command within its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Queued on its own
    Single,
    /// Enable-config opening a bracket
    Enter,
    /// Command inside a bracket
    Body,
    /// Disable-config closing a bracket
    Exit,
}

#[derive(Debug, Clone)]
struct Step {
    command: Command,
    role: Role,
}

/// Bounded FIFO of outgoing commands
#[derive(Debug)]
pub struct CommandSequence {
    queue: Deque<Step, QUEUE_CAPACITY>,
    in_flight: Option<Role>,
    status: SequenceStatus,
}

impl Default for CommandSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSequence {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            in_flight: None,
            status: SequenceStatus::Idle,
        }
    }

    pub fn status(&self) -> SequenceStatus {
        self.status
    }

    /// Number of commands not yet transmitted
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Free slots left in the queue
    pub fn remaining(&self) -> usize {
        QUEUE_CAPACITY - self.queue.len()
    }

    /// True if a disable-config command is waiting to be sent
    pub fn has_exit_queued(&self) -> bool {
        self.queue
            .iter()
            .any(|step| step.command.opcode == Opcode::DisableConfig)
    }

    /// Queue a single command as is
    ///
    /// Gives the command back if the queue is full.
    pub fn push(&mut self, command: Command) -> Result<(), Command> {
        self.queue
            .push_back(Step {
                command,
                role: Role::Single,
            })
            .map_err(|step| step.command)?;
        self.status = SequenceStatus::Running;
        Ok(())
    }

    /// Queue `commands` between enable and disable configuration mode
    ///
    /// All or nothing: returns `false` without queueing anything if the
    /// whole bracketed sequence does not fit.
    pub fn push_configured(&mut self, commands: &[Command]) -> bool {
        if commands.len() + 2 > self.remaining() {
            return false;
        }

        let enter = Step {
            command: Command::enable_config(),
            role: Role::Enter,
        };
        let body = commands.iter().map(|command| Step {
            command: command.clone(),
            role: Role::Body,
        });
        let exit = Step {
            command: Command::disable_config(),
            role: Role::Exit,
        };
        for step in core::iter::once(enter).chain(body).chain(core::iter::once(exit)) {
            if self.queue.push_back(step).is_err() {
                return false;
            }
        }
        self.status = SequenceStatus::Running;
        true
    }

    /// Queue a lone disable-config, leaving the status alone
    ///
    /// Returns `false` if the queue is full.
    pub fn push_exit(&mut self) -> bool {
        self.queue
            .push_back(Step {
                command: Command::disable_config(),
                role: Role::Exit,
            })
            .is_ok()
    }

    /// Take the next command to transmit
    ///
    /// Starting a new sequence after a failure reports it as running again.
    pub fn next_command(&mut self) -> Option<Command> {
        let step = self.queue.pop_front()?;
        if matches!(step.role, Role::Single | Role::Enter)
            && matches!(self.status, SequenceStatus::Failed { .. })
        {
            self.status = SequenceStatus::Running;
        }
        self.in_flight = Some(step.role);
        Some(step.command)
    }

    /// Record that the outstanding command was acknowledged
    pub fn step_done(&mut self) {
        self.in_flight = None;
        if self.queue.is_empty() && self.status == SequenceStatus::Running {
            self.status = SequenceStatus::Completed;
        }
    }

    /// Abort the bracket `opcode` belonged to
    ///
    /// Drops the remaining steps of that bracket. Its disable-config step is
    /// kept when `keep_exit` is set, i.e. the radar is or may be in
    /// configuration mode. Later brackets stay queued.
    pub fn fail(&mut self, opcode: Opcode, reason: FailureReason, keep_exit: bool) {
        self.status = SequenceStatus::Failed { opcode, reason };

        if !matches!(self.in_flight.take(), Some(Role::Enter | Role::Body)) {
            return;
        }
        while matches!(self.queue.front(), Some(step) if step.role == Role::Body) {
            self.queue.pop_front();
        }
        if !keep_exit && matches!(self.queue.front(), Some(step) if step.role == Role::Exit) {
            self.queue.pop_front();
        }
    }
}
