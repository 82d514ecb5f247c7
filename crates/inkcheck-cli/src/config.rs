//! CLI configuration

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Map `-v` count and `-q` flag to a level
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Log filter used when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Debug => "trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Apply to the `console` styling globals
    pub fn apply(self) {
        match self {
            Self::Always => {
                console::set_colors_enabled(true);
                console::set_colors_enabled_stderr(true);
            }
            Self::Never => {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
            Self::Auto => {}
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(3, false), Verbosity::Debug);
            assert_eq!(Verbosity::from_flags(2, true), Verbosity::Quiet);
        }

        #[test]
        fn test_filter_directive() {
            assert_eq!(Verbosity::Quiet.filter_directive(), "error");
            assert_eq!(Verbosity::Normal.filter_directive(), "info");
            assert_eq!(Verbosity::Verbose.filter_directive(), "debug");
        }

        #[test]
        fn test_predicates() {
            assert!(Verbosity::Quiet.is_quiet());
            assert!(Verbosity::Debug.is_verbose());
            assert!(!Verbosity::Normal.is_verbose());
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let config = CliConfig::new()
                .with_verbosity(Verbosity::Verbose)
                .with_color(ColorChoice::Never);
            assert_eq!(config.verbosity, Verbosity::Verbose);
            assert_eq!(config.color, ColorChoice::Never);
        }
    }
}
