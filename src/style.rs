//! ANSI terminal color styling for diagnostics.
//!
//! Grounded on `crates/logicaffeine_language/src/style.rs` in the
//! teacher's pack (that subcrate wasn't copied into this workspace, but
//! its `Style` helper is small enough to reproduce verbatim here).

pub struct Style;

impl Style {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const RED: &'static str = "\x1b[31m";
    pub const BLUE: &'static str = "\x1b[34m";
    pub const CYAN: &'static str = "\x1b[36m";

    pub fn red(s: &str) -> String {
        format!("{}{}{}", Self::RED, s, Self::RESET)
    }

    pub fn blue(s: &str) -> String {
        format!("{}{}{}", Self::BLUE, s, Self::RESET)
    }

    pub fn cyan(s: &str) -> String {
        format!("{}{}{}", Self::CYAN, s, Self::RESET)
    }

    pub fn bold_red(s: &str) -> String {
        format!("{}{}{}{}", Self::BOLD, Self::RED, s, Self::RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_wraps_string() {
        let result = Style::red("error");
        assert!(result.contains("\x1b[31m"));
        assert!(result.contains("error"));
        assert!(result.contains("\x1b[0m"));
    }
}
