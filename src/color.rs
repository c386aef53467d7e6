//! Color mode and ANSI painting helpers

use std::io::IsTerminal;

use clap::ValueEnum;

pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const RED: &str = "\x1b[31;1m";
pub const CYAN: &str = "\x1b[36m";

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

fn no_color_env() -> bool {
    no_color_set(std::env::var_os("NO_COLOR").as_deref())
}

// Per https://no-color.org/, only a non-empty value disables color
fn no_color_set(value: Option<&std::ffi::OsStr>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn color_enabled_for(mode: ColorMode, no_color: bool, is_tty: bool) -> bool {
    if no_color {
        return false;
    }
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => is_tty,
    }
}

pub fn color_enabled_stdout(mode: ColorMode) -> bool {
    color_enabled_for(mode, no_color_env(), std::io::stdout().is_terminal())
}

pub fn color_enabled_stderr(mode: ColorMode) -> bool {
    color_enabled_for(mode, no_color_env(), std::io::stderr().is_terminal())
}

/// Wrap string with ANSI color code when enabled; otherwise return unchanged.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

pub fn log_warn_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, YELLOW, msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, RED, msg));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ColorMode::Always, false, false, true)]
    #[case(ColorMode::Always, true, true, false)]
    #[case(ColorMode::Never, false, true, false)]
    #[case(ColorMode::Auto, false, true, true)]
    #[case(ColorMode::Auto, false, false, false)]
    fn color_enabled_for_returns_expected(
        #[case] mode: ColorMode,
        #[case] no_color: bool,
        #[case] is_tty: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(color_enabled_for(mode, no_color, is_tty), expected);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(""), false)]
    #[case(Some("1"), true)]
    #[case(Some("false"), true)]
    fn no_color_set_requires_non_empty_value(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(no_color_set(value.map(std::ffi::OsStr::new)), expected);
    }

    #[test]
    fn paint_is_identity_when_disabled() {
        assert_eq!(paint(false, RED, "error"), "error");
        assert_eq!(paint(true, RED, "error"), "\x1b[31;1merror\x1b[0m");
    }
}
