//! Nickname validation.

/// Maximum nickname length accepted by the server.
pub const NICK_MAX_LEN: usize = 9;

/// Extension trait for checking nickname validity.
pub trait NickExt {
    /// Check whether this string is an acceptable nickname.
    ///
    /// Valid nicknames:
    /// - 1 to 9 characters
    /// - first character: letter or one of `[ ] { } \ | _ ^`
    /// - remaining characters: letter, digit, hyphen, or one of the above
    fn is_valid_nick(&self) -> bool;
}

/// The special characters allowed in nicknames.
#[inline]
fn is_special(c: char) -> bool {
    matches!(c, '[' | ']' | '{' | '}' | '\\' | '|' | '_' | '^')
}

impl NickExt for &str {
    fn is_valid_nick(&self) -> bool {
        if self.is_empty() || self.chars().count() > NICK_MAX_LEN {
            return false;
        }

        let mut chars = self.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return false,
        };
        if !first.is_ascii_alphabetic() && !is_special(first) {
            return false;
        }

        chars.all(|c| c.is_ascii_alphanumeric() || is_special(c) || c == '-')
    }
}

impl NickExt for String {
    fn is_valid_nick(&self) -> bool {
        self.as_str().is_valid_nick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_nicks() {
        assert!("alice".is_valid_nick());
        assert!("Alice123".is_valid_nick());
        assert!("[bob]".is_valid_nick());
        assert!("_under_".is_valid_nick());
        assert!("a".is_valid_nick());
        assert!("n-dash".is_valid_nick());
        assert!("User|AFK".is_valid_nick());
    }

    #[test]
    fn invalid_nicks() {
        assert!(!"".is_valid_nick());
        assert!(!"1alice".is_valid_nick()); // digit first
        assert!(!"-alice".is_valid_nick()); // hyphen first
        assert!(!"alice bob".is_valid_nick()); // space
        assert!(!"nick@host".is_valid_nick());
        assert!(!"tenletters".is_valid_nick()); // too long
        assert!(!"`tick".is_valid_nick()); // backtick is not accepted here
    }

    #[test]
    fn length_boundary() {
        assert!("ninechars".is_valid_nick());
        assert!(!"tencharsxx".is_valid_nick());
    }
}
