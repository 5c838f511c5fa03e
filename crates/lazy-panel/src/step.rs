//! Steps of a panel script

use std::fmt;

/// One stage of a panel script, used for logs and timeout reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStep {
    Launch,
    OpenLogin,
    SubmitLogin,
    OpenForm,
    FillForm,
    Submit,
    AwaitResult,
    /// Read the result (key creation) or click the reset action (HWID reset)
    Scrape,
    Close,
}

impl PanelStep {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::OpenLogin => "open login",
            Self::SubmitLogin => "submit login",
            Self::OpenForm => "open form",
            Self::FillForm => "fill form",
            Self::Submit => "submit",
            Self::AwaitResult => "await result",
            Self::Scrape => "scrape",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for PanelStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PanelStep::SubmitLogin.to_string(), "submit login");
        assert_eq!(PanelStep::AwaitResult.to_string(), "await result");
    }
}
