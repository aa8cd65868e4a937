//! The [`Status`] tri-state.

/// Presence of a typed value.
///
/// Every typed value carries its own status. Payload fields are only
/// meaningful when the status is [`Present`][Status::Present], a
/// [`Null`][Status::Null] value keeps its payload at the zero form.
///
/// [`Undefined`][Status::Undefined] is the [`Default`], it marks a value that
/// was never populated, which is different from an explicit SQL `NULL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Value was never set or decoded.
    #[default]
    Undefined,
    /// SQL `NULL`.
    Null,
    /// Value is present.
    Present,
}

impl Status {
    /// Returns `true` if status is [`Present`][Status::Present].
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    /// Returns `true` if status is [`Null`][Status::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
