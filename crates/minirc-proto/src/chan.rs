//! Channel name validation.

/// Extension trait for checking channel-name validity.
pub trait ChannelExt {
    /// Check whether this string is a valid channel name: a `#` or `&`
    /// prefix followed by up to 49 characters with no space, comma, or
    /// control characters.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for &str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();

        match chars.next() {
            Some('#') | Some('&') => {}
            _ => return false,
        }

        if self.chars().count() > 50 {
            return false;
        }

        chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
