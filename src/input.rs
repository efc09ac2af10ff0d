//! Translation from raw platform key events to the logical key space.
//!
//! The render loop receives raw key symbols with modifier bits from the
//! platform layer and normalizes them into [`LogicalKey`]s: printable keys
//! become their (case-folded) code point, ctrl combinations a dedicated
//! control code, and a fixed set of navigation keys their own codes.
//! Everything the mapping cannot express is reported as untranslatable so
//! the caller can log and drop it.
//!
//! Logical keys also have a stable integer encoding ([`LogicalKey::code`])
//! so the control channel can inject key presses as plain integers.

/// Modifier bits attached to a raw key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    /// No modifier held.
    pub const NONE: Modifiers = Modifiers(0);
    /// Shift (either side).
    pub const SHIFT: Modifiers = Modifiers(1 << 0);
    /// Control (either side).
    pub const CTRL: Modifiers = Modifiers(1 << 1);
    /// Alt (either side).
    pub const ALT: Modifiers = Modifiers(1 << 2);
    /// GUI / super key.
    pub const GUI: Modifiers = Modifiers(1 << 3);
    /// Num lock state.
    pub const NUM_LOCK: Modifiers = Modifiers(1 << 4);
    /// Caps lock state.
    pub const CAPS_LOCK: Modifiers = Modifiers(1 << 5);

    /// Whether all bits of `other` are set.
    #[inline]
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// These modifiers with the bits of `other` cleared.
    #[inline]
    #[must_use]
    pub fn without(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & !other.0)
    }

    /// Whether no bit is set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// A raw key symbol as delivered by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKey {
    /// A key with a character symbol.
    Char(char),
    /// Left control key itself.
    LeftCtrl,
    /// Right control key itself.
    RightCtrl,
    /// Arrow right.
    Right,
    /// Arrow left.
    Left,
    /// Arrow down.
    Down,
    /// Arrow up.
    Up,
    /// Page down.
    PageDown,
    /// Page up.
    PageUp,
    /// Any other platform key, identified by its scan code.
    Other(u32),
}

/// A raw key event: symbol plus modifier bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySym {
    /// The key symbol.
    pub key: RawKey,
    /// Modifier state at press time.
    pub mods: Modifiers,
}

impl KeySym {
    /// Convenience constructor.
    pub fn new(key: RawKey, mods: Modifiers) -> Self {
        Self { key, mods }
    }
}

/// Base of the code range used for navigation keys, above any code point.
const NAV_CODE_BASE: i64 = 1 << 21;
/// Bit marking a ctrl-combined code.
const CTRL_CODE_BIT: i64 = 1 << 22;

/// A normalized, platform-independent key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKey {
    /// A printable key, case-folded for shift.
    Char(char),
    /// Control held together with a printable key.
    Ctrl(char),
    /// Arrow right.
    Right,
    /// Arrow left.
    Left,
    /// Arrow down.
    Down,
    /// Arrow up.
    Up,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
}

impl LogicalKey {
    /// Stable integer encoding, usable over the control channel.
    pub fn code(self) -> i64 {
        match self {
            LogicalKey::Char(c) => c as i64,
            LogicalKey::Ctrl(c) => CTRL_CODE_BIT | c as i64,
            LogicalKey::Right => NAV_CODE_BASE,
            LogicalKey::Left => NAV_CODE_BASE + 1,
            LogicalKey::Down => NAV_CODE_BASE + 2,
            LogicalKey::Up => NAV_CODE_BASE + 3,
            LogicalKey::PageUp => NAV_CODE_BASE + 4,
            LogicalKey::PageDown => NAV_CODE_BASE + 5,
        }
    }

    /// Decode an integer code back into a logical key.
    pub fn from_code(code: i64) -> Option<LogicalKey> {
        if code & CTRL_CODE_BIT != 0 {
            let c = char::from_u32((code & !CTRL_CODE_BIT) as u32)?;
            return Some(LogicalKey::Ctrl(c));
        }
        match code {
            c if c > 0 && c < NAV_CODE_BASE => char::from_u32(c as u32).map(LogicalKey::Char),
            c if c == NAV_CODE_BASE => Some(LogicalKey::Right),
            c if c == NAV_CODE_BASE + 1 => Some(LogicalKey::Left),
            c if c == NAV_CODE_BASE + 2 => Some(LogicalKey::Down),
            c if c == NAV_CODE_BASE + 3 => Some(LogicalKey::Up),
            c if c == NAV_CODE_BASE + 4 => Some(LogicalKey::PageUp),
            c if c == NAV_CODE_BASE + 5 => Some(LogicalKey::PageDown),
            _ => None,
        }
    }
}

/// Outcome of translating a raw key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// A logical key.
    Key(LogicalKey),
    /// Deliberately not interpreted (lone modifier press).
    Ignored,
    /// No mapping exists for this symbol/modifier combination.
    Untranslatable,
}

/// Translate a raw key event into the logical key space.
///
/// Lock modifiers are stripped first; a lone control key press is a no-op.
/// Control and shift are recognized (shift uppercases printable ASCII);
/// any other remaining modifier makes the event untranslatable.
pub fn translate(sym: KeySym) -> Translation {
    let mods = sym.mods.without(Modifiers::NUM_LOCK | Modifiers::CAPS_LOCK);

    if matches!(sym.key, RawKey::LeftCtrl | RawKey::RightCtrl) {
        return Translation::Ignored;
    }

    let ctrl = mods.contains(Modifiers::CTRL);
    let mods = mods.without(Modifiers::CTRL);
    let shift = mods.contains(Modifiers::SHIFT);
    let mods = mods.without(Modifiers::SHIFT);

    if !mods.is_empty() {
        return Translation::Untranslatable;
    }

    match sym.key {
        RawKey::Char(c) => {
            let c = if shift { c.to_ascii_uppercase() } else { c };
            if ctrl {
                Translation::Key(LogicalKey::Ctrl(c))
            } else {
                Translation::Key(LogicalKey::Char(c))
            }
        }
        RawKey::Right => Translation::Key(LogicalKey::Right),
        RawKey::Left => Translation::Key(LogicalKey::Left),
        RawKey::Down => Translation::Key(LogicalKey::Down),
        RawKey::Up => Translation::Key(LogicalKey::Up),
        RawKey::PageDown => Translation::Key(LogicalKey::PageDown),
        RawKey::PageUp => Translation::Key(LogicalKey::PageUp),
        RawKey::LeftCtrl | RawKey::RightCtrl => Translation::Ignored,
        RawKey::Other(_) => Translation::Untranslatable,
    }
}

/// Keys the render loop handles itself, with a short description for help
/// text and external registration.
pub const KEYBINDINGS: [(char, &str); 3] = [
    ('d', "toggle deinterlace"),
    ('f', "toggle fullscreen"),
    ('q', "quit"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char, mods: Modifiers) -> Translation {
        translate(KeySym::new(RawKey::Char(c), mods))
    }

    #[test]
    fn test_lock_modifiers_ignored() {
        assert_eq!(key('d', Modifiers::CAPS_LOCK), key('d', Modifiers::NONE));
        assert_eq!(
            key('d', Modifiers::NUM_LOCK | Modifiers::CAPS_LOCK),
            Translation::Key(LogicalKey::Char('d'))
        );
    }

    #[test]
    fn test_lone_ctrl_is_noop() {
        assert_eq!(
            translate(KeySym::new(RawKey::LeftCtrl, Modifiers::NONE)),
            Translation::Ignored
        );
        assert_eq!(
            translate(KeySym::new(RawKey::RightCtrl, Modifiers::CTRL)),
            Translation::Ignored
        );
    }

    #[test]
    fn test_shift_uppercases() {
        assert_eq!(
            key('a', Modifiers::SHIFT),
            Translation::Key(LogicalKey::Char('A'))
        );
    }

    #[test]
    fn test_ctrl_combination() {
        assert_eq!(
            key('x', Modifiers::CTRL),
            Translation::Key(LogicalKey::Ctrl('x'))
        );
        assert_eq!(
            key('x', Modifiers::CTRL | Modifiers::SHIFT),
            Translation::Key(LogicalKey::Ctrl('X'))
        );
    }

    #[test]
    fn test_other_modifiers_untranslatable() {
        assert_eq!(key('a', Modifiers::ALT), Translation::Untranslatable);
        assert_eq!(key('a', Modifiers::GUI), Translation::Untranslatable);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(
            translate(KeySym::new(RawKey::PageUp, Modifiers::NONE)),
            Translation::Key(LogicalKey::PageUp)
        );
        assert_eq!(
            translate(KeySym::new(RawKey::Left, Modifiers::NONE)),
            Translation::Key(LogicalKey::Left)
        );
    }

    #[test]
    fn test_unknown_key_untranslatable() {
        assert_eq!(
            translate(KeySym::new(RawKey::Other(0x52), Modifiers::NONE)),
            Translation::Untranslatable
        );
    }

    #[test]
    fn test_code_round_trip() {
        let keys = [
            LogicalKey::Char('d'),
            LogicalKey::Ctrl('c'),
            LogicalKey::Right,
            LogicalKey::PageDown,
        ];
        for k in keys {
            assert_eq!(LogicalKey::from_code(k.code()), Some(k));
        }
        assert_eq!(LogicalKey::Char('d').code(), 100);
    }

    #[test]
    fn test_bad_codes_rejected() {
        assert_eq!(LogicalKey::from_code(0), None);
        assert_eq!(LogicalKey::from_code(-5), None);
        assert_eq!(LogicalKey::from_code(NAV_CODE_BASE + 99), None);
    }
}
