//! Text decoration for titles, narration and commands.

use colored::Colorize;

/// Colors applied to the different kinds of demo output.
///
/// A disabled palette returns every string unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn title(&self, text: &str) -> String {
        if self.enabled {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn narration(&self, text: &str) -> String {
        if self.enabled {
            text.white().dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn command(&self, text: &str) -> String {
        if self.enabled {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_identity() {
        let palette = Palette::plain();
        assert_eq!(palette.title("Title"), "Title");
        assert_eq!(palette.narration("# desc"), "# desc");
        assert_eq!(palette.command("> echo hi"), "> echo hi");
    }

    #[test]
    fn test_enabled_keeps_text() {
        let palette = Palette::new(true);
        assert!(palette.title("Title").contains("Title"));
        assert!(palette.command("> ls").contains("> ls"));
    }
}
