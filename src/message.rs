//! Pipeline status messages
//!
//! The engine hands the dispatcher a borrowed view of each bus message that
//! is only valid for the duration of the callback. [`StatusMessage`] is the
//! owned copy that crosses into the consumer's queue.

/// Kind of a bus message, with the engine's raw bit values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Unknown,
    Eos,
    Error,
    Warning,
    Info,
    Tag,
    Buffering,
    StateChanged,
    /// Wildcard matching every kind
    Any,
}

impl MessageKind {
    /// Decode an engine message type; unrecognised values map to `Unknown`
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => MessageKind::Eos,
            2 => MessageKind::Error,
            4 => MessageKind::Warning,
            8 => MessageKind::Info,
            16 => MessageKind::Tag,
            32 => MessageKind::Buffering,
            64 => MessageKind::StateChanged,
            u32::MAX => MessageKind::Any,
            _ => MessageKind::Unknown,
        }
    }

    /// Engine message type value
    pub fn as_raw(self) -> u32 {
        match self {
            MessageKind::Unknown => 0,
            MessageKind::Eos => 1,
            MessageKind::Error => 2,
            MessageKind::Warning => 4,
            MessageKind::Info => 8,
            MessageKind::Tag => 16,
            MessageKind::Buffering => 32,
            MessageKind::StateChanged => 64,
            MessageKind::Any => u32::MAX,
        }
    }

    /// Canonical kind name as the engine spells it
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Unknown => "unknown",
            MessageKind::Eos => "eos",
            MessageKind::Error => "error",
            MessageKind::Warning => "warning",
            MessageKind::Info => "info",
            MessageKind::Tag => "tag",
            MessageKind::Buffering => "buffering",
            MessageKind::StateChanged => "state-changed",
            MessageKind::Any => "any",
        }
    }

    /// Check whether a message of this kind is selected by `filter`
    ///
    /// [`MessageKind::Any`] selects every kind.
    ///
    /// ```
    /// use pipeline_bridge::{MessageKind, StatusMessage};
    ///
    /// let messages = vec![
    ///     StatusMessage::new(MessageKind::StateChanged, 1),
    ///     StatusMessage::new(MessageKind::Error, 2).with_detail("no decoder"),
    ///     StatusMessage::new(MessageKind::Eos, 3),
    /// ];
    ///
    /// let errors = messages
    ///     .iter()
    ///     .filter(|m| m.kind().matches(MessageKind::Error))
    ///     .count();
    /// let all = messages
    ///     .iter()
    ///     .filter(|m| m.kind().matches(MessageKind::Any))
    ///     .count();
    /// assert_eq!((errors, all), (1, 3));
    /// ```
    pub fn matches(self, filter: MessageKind) -> bool {
        filter == MessageKind::Any || filter == self
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed view of an engine bus message
///
/// Implemented by engine backends over their native message type. Nothing
/// returned here may be retained past the dispatch call.
pub trait NativeMessage {
    fn kind(&self) -> MessageKind;

    /// Engine timestamp in nanoseconds
    fn timestamp(&self) -> u64;

    /// Kind name as reported by the engine
    fn kind_name(&self) -> &str {
        self.kind().name()
    }

    /// Human-readable payload (error text, new state, tag list, ...)
    fn detail(&self) -> Option<String> {
        None
    }
}

/// Owned status message delivered on a pipeline's bus queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    kind: MessageKind,
    timestamp: u64,
    kind_name: String,
    detail: Option<String>,
}

impl StatusMessage {
    /// Build a message directly, e.g. for engines without a native view
    pub fn new(kind: MessageKind, timestamp: u64) -> Self {
        Self {
            kind,
            timestamp,
            kind_name: kind.name().to_owned(),
            detail: None,
        }
    }

    /// Attach a payload description
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Copy everything needed out of a native message
    pub fn from_native<M: NativeMessage + ?Sized>(message: &M) -> Self {
        Self {
            kind: message.kind(),
            timestamp: message.timestamp(),
            kind_name: message.kind_name().to_owned(),
            detail: message.detail(),
        }
    }

    /// Message type
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Engine timestamp of the message
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Engine name of the message type
    pub fn kind_name(&self) -> &str {
        &self.kind_name
    }

    /// Payload description, if the engine rendered one
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Check if this is an end-of-stream message
    pub fn is_eos(&self) -> bool {
        self.kind == MessageKind::Eos
    }

    /// Check if this is an error message
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.kind_name)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}
