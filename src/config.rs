//! Session configuration from a string-encoded option list.
//!
//! Options arrive as a colon-separated token list, e.g.
//! `fs:keep-aspect:display=1:fixed_size=1280x720`. Unknown tokens are a
//! configuration error; the `help` token short-circuits parsing.

use crate::error::{Error, Result};
use crate::input::KEYBINDINGS;

/// Deinterlacing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeintMode {
    /// Never deinterlace.
    #[default]
    Off,
    /// Deinterlace frames marked interlaced-merged.
    On,
    /// Deinterlace every frame.
    Force,
}

impl DeintMode {
    /// Uppercase name, used when logging toggles.
    pub fn name(self) -> &'static str {
        match self {
            DeintMode::Off => "OFF",
            DeintMode::On => "ON",
            DeintMode::Force => "FORCE",
        }
    }
}

/// User-configurable session options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Deinterlacing policy.
    pub deinterlace: DeintMode,
    /// Display to center the window on.
    pub display_index: u32,
    /// Video driver name override.
    pub driver: Option<String>,
    /// Start fullscreen.
    pub fullscreen: bool,
    /// Sync presentation to vertical blank.
    pub vsync: bool,
    /// Create the window without decoration.
    pub borderless: bool,
    /// Keep the window aspect ratio matched to the video on user resize.
    pub keep_aspect: bool,
    /// Never resize the window on reconfiguration.
    pub fixed_size: bool,
    /// Fixed window geometry, if given with `fixed_size=WxH`.
    pub fixed_width: u32,
    /// See `fixed_width`.
    pub fixed_height: u32,
    /// Raw backend window-creation flag bits.
    pub window_flags: u32,
    /// Explicit window position.
    pub position: Option<(i32, i32)>,
    /// Specific renderer index.
    pub renderer_index: Option<u32>,
    /// Advertise the experimental 10-bit RGB format.
    pub extended_formats: bool,
    /// Window title override.
    pub title: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            deinterlace: DeintMode::Off,
            display_index: 0,
            driver: None,
            fullscreen: false,
            vsync: true,
            borderless: false,
            keep_aspect: false,
            fixed_size: false,
            fixed_width: 0,
            fixed_height: 0,
            window_flags: 0,
            position: None,
            renderer_index: None,
            extended_formats: false,
            title: None,
        }
    }
}

/// Result of parsing an option string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// A usable configuration.
    Session(DisplayConfig),
    /// The `help` token was present; show [`help`] and do not start.
    Help,
}

impl DisplayConfig {
    /// Parse a colon-separated option list. An empty string yields the
    /// default configuration.
    pub fn parse(spec: &str) -> Result<Parsed> {
        let mut cfg = DisplayConfig::default();

        for token in spec.split(':').filter(|t| !t.is_empty()) {
            match token {
                "d" => cfg.deinterlace = DeintMode::On,
                "dforce" => cfg.deinterlace = DeintMode::Force,
                "fs" => cfg.fullscreen = true,
                "help" => return Ok(Parsed::Help),
                "novsync" => cfg.vsync = false,
                "nodecorate" => cfg.borderless = true,
                "keep-aspect" => cfg.keep_aspect = true,
                "fixed_size" => cfg.fixed_size = true,
                "r10k" => cfg.extended_formats = true,
                _ => Self::parse_valued(&mut cfg, token)?,
            }
        }

        Ok(Parsed::Session(cfg))
    }

    fn parse_valued(cfg: &mut DisplayConfig, token: &str) -> Result<()> {
        let (name, value) = token
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("unknown option: {token}")))?;
        match name {
            "display" => {
                cfg.display_index = value
                    .parse()
                    .map_err(|_| Error::Config(format!("bad display index: {value}")))?;
            }
            "driver" => cfg.driver = Some(value.to_string()),
            "fixed_size" => {
                cfg.fixed_size = true;
                let (w, h) = value
                    .split_once('x')
                    .ok_or_else(|| Error::Config(format!("bad fixed size: {value}")))?;
                cfg.fixed_width = w
                    .parse()
                    .map_err(|_| Error::Config(format!("bad fixed size: {value}")))?;
                cfg.fixed_height = h
                    .parse()
                    .map_err(|_| Error::Config(format!("bad fixed size: {value}")))?;
            }
            "window_flags" => {
                cfg.window_flags = parse_flags(value)
                    .ok_or_else(|| Error::Config(format!("bad window flags: {value}")))?;
            }
            "pos" => {
                let (x, y) = value
                    .split_once(',')
                    .ok_or_else(|| Error::Config(format!("bad position: {value}")))?;
                let x = x
                    .parse()
                    .map_err(|_| Error::Config(format!("bad position: {value}")))?;
                let y = y
                    .parse()
                    .map_err(|_| Error::Config(format!("bad position: {value}")))?;
                cfg.position = Some((x, y));
            }
            "renderer" => {
                cfg.renderer_index = Some(
                    value
                        .parse()
                        .map_err(|_| Error::Config(format!("bad renderer index: {value}")))?,
                );
            }
            "title" => cfg.title = Some(value.to_string()),
            _ => return Err(Error::Config(format!("unknown option: {token}"))),
        }
        Ok(())
    }
}

fn parse_flags(value: &str) -> Option<u32> {
    if let Some(hex) = value.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}

/// Reference text for the option list and keyboard shortcuts.
pub fn help() -> String {
    let mut out = String::from(
        "display options (colon-separated):\n\
         \td[force]         - deinterlace (force even for progressive video)\n\
         \tfs               - fullscreen\n\
         \tdisplay=<didx>   - display index to center the window on\n\
         \tdriver=<drv>     - video driver override\n\
         \tkeep-aspect      - keep window aspect ratio respective to the video\n\
         \tnovsync          - disable sync on vertical blank\n\
         \tnodecorate       - disable window border\n\
         \tfixed_size[=WxH] - use a fixed-size window\n\
         \twindow_flags=<f> - raw window-creation flags (0x prefix for hex)\n\
         \tpos=<x>,<y>      - window position\n\
         \trenderer=<ridx>  - renderer index\n\
         \tr10k             - advertise 10-bit RGB (experimental)\n\
         \ttitle=<text>     - window title\n\
         \nkeyboard shortcuts:\n",
    );
    for (key, description) in KEYBINDINGS {
        out.push_str(&format!("\t'{key}' - {description}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_session(spec: &str) -> DisplayConfig {
        match DisplayConfig::parse(spec).unwrap() {
            Parsed::Session(cfg) => cfg,
            Parsed::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse_session(""), DisplayConfig::default());
    }

    #[test]
    fn test_flag_options() {
        let cfg = parse_session("d:fs:novsync:nodecorate:keep-aspect:r10k");
        assert_eq!(cfg.deinterlace, DeintMode::On);
        assert!(cfg.fullscreen);
        assert!(!cfg.vsync);
        assert!(cfg.borderless);
        assert!(cfg.keep_aspect);
        assert!(cfg.extended_formats);
    }

    #[test]
    fn test_dforce() {
        assert_eq!(parse_session("dforce").deinterlace, DeintMode::Force);
    }

    #[test]
    fn test_valued_options() {
        let cfg = parse_session("display=1:driver=wayland:pos=10,-20:renderer=2:title=main out");
        assert_eq!(cfg.display_index, 1);
        assert_eq!(cfg.driver.as_deref(), Some("wayland"));
        assert_eq!(cfg.position, Some((10, -20)));
        assert_eq!(cfg.renderer_index, Some(2));
        assert_eq!(cfg.title.as_deref(), Some("main out"));
    }

    #[test]
    fn test_fixed_size() {
        let bare = parse_session("fixed_size");
        assert!(bare.fixed_size);
        assert_eq!((bare.fixed_width, bare.fixed_height), (0, 0));

        let sized = parse_session("fixed_size=1280x720");
        assert!(sized.fixed_size);
        assert_eq!((sized.fixed_width, sized.fixed_height), (1280, 720));

        assert!(DisplayConfig::parse("fixed_size=1280").is_err());
    }

    #[test]
    fn test_window_flags_hex() {
        assert_eq!(parse_session("window_flags=0x20").window_flags, 0x20);
        assert_eq!(parse_session("window_flags=16").window_flags, 16);
        assert!(DisplayConfig::parse("window_flags=zz").is_err());
    }

    #[test]
    fn test_help_token() {
        assert_eq!(DisplayConfig::parse("help").unwrap(), Parsed::Help);
        assert_eq!(DisplayConfig::parse("fs:help:bogus").unwrap(), Parsed::Help);
    }

    #[test]
    fn test_unknown_option_fails() {
        assert!(DisplayConfig::parse("bogus").is_err());
        assert!(DisplayConfig::parse("pos=12").is_err());
    }

    #[test]
    fn test_help_text_lists_keybindings() {
        let text = help();
        assert!(text.contains("toggle deinterlace"));
        assert!(text.contains("'q'"));
    }
}
