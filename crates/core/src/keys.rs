//! Logical key identifiers, named key groups, and colors.
//!
//! A key code packs its address group in the high byte and the
//! intra-group offset in the low byte. For the `keys` group the offset is
//! the USB HID usage code of the key.

use serde::Serialize;

/// Address group: an independently addressed key zone in the device protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum KeyAddressGroup {
    Logo = 0x00,
    Indicators = 0x01,
    Multimedia = 0x02,
    GKeys = 0x03,
    Keys = 0x04,
}

impl KeyAddressGroup {
    /// Groups in the order frames are emitted.
    pub const ALL: [KeyAddressGroup; 5] = [
        KeyAddressGroup::Logo,
        KeyAddressGroup::Indicators,
        KeyAddressGroup::Multimedia,
        KeyAddressGroup::GKeys,
        KeyAddressGroup::Keys,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum Key {
    Logo = 0x0001,
    Logo2,

    Backlight = 0x0101,
    Game,
    Caps,
    Scroll,
    Num,

    Next = 0x02B5,
    Prev,
    Stop,
    Play = 0x02CD,
    Mute = 0x02E2,

    G1 = 0x0301,
    G2,
    G3,
    G4,
    G5,
    G6,
    G7,
    G8,
    G9,

    A = 0x0404,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    N7,
    N8,
    N9,
    N0,
    Enter,
    Esc,
    Backspace,
    Tab,
    Space,
    Minus,
    Equal,
    OpenBracket,
    CloseBracket,
    Backslash,
    Dollar,
    Semicolon,
    Quote,
    Tilde,
    Comma,
    Period,
    Slash,
    CapsLock,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    PrintScreen,
    ScrollLock,
    PauseBreak,
    Insert,
    Home,
    PageUp,
    Delete,
    End,
    PageDown,
    ArrowRight,
    ArrowLeft,
    ArrowBottom,
    ArrowTop,
    NumLock,
    NumSlash,
    NumAsterisk,
    NumMinus,
    NumPlus,
    NumEnter,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Num0,
    NumDot,
    IntlBackslash,
    Menu,

    CtrlLeft = 0x04E0,
    ShiftLeft,
    AltLeft,
    WinLeft,
    CtrlRight,
    ShiftRight,
    AltRight,
    WinRight,
}

const LETTERS: [Key; 26] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

/// Indexed by digit value.
const DIGITS: [Key; 10] = [
    Key::N0, Key::N1, Key::N2, Key::N3, Key::N4,
    Key::N5, Key::N6, Key::N7, Key::N8, Key::N9,
];

/// Indexed by digit value.
const NUMPAD_DIGITS: [Key; 10] = [
    Key::Num0, Key::Num1, Key::Num2, Key::Num3, Key::Num4,
    Key::Num5, Key::Num6, Key::Num7, Key::Num8, Key::Num9,
];

const GROUP_LOGO: &[Key] = &[Key::Logo, Key::Logo2];

const GROUP_INDICATORS: &[Key] = &[Key::Caps, Key::Num, Key::Scroll, Key::Game, Key::Backlight];

const GROUP_MULTIMEDIA: &[Key] = &[Key::Next, Key::Prev, Key::Stop, Key::Play, Key::Mute];

const GROUP_GKEYS: &[Key] = &[
    Key::G1, Key::G2, Key::G3, Key::G4, Key::G5, Key::G6, Key::G7, Key::G8, Key::G9,
];

const GROUP_FKEYS: &[Key] = &[
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
    Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
];

const GROUP_MODIFIERS: &[Key] = &[
    Key::ShiftLeft,
    Key::CtrlLeft,
    Key::WinLeft,
    Key::AltLeft,
    Key::AltRight,
    Key::WinRight,
    Key::CtrlRight,
    Key::ShiftRight,
    Key::Menu,
];

const GROUP_FUNCTIONS: &[Key] = &[
    Key::Esc,
    Key::PrintScreen,
    Key::ScrollLock,
    Key::PauseBreak,
    Key::Insert,
    Key::Delete,
    Key::Home,
    Key::End,
    Key::PageUp,
    Key::PageDown,
];

const GROUP_ARROWS: &[Key] = &[Key::ArrowTop, Key::ArrowLeft, Key::ArrowBottom, Key::ArrowRight];

const GROUP_NUMERIC: &[Key] = &[
    Key::Num1, Key::Num2, Key::Num3, Key::Num4, Key::Num5,
    Key::Num6, Key::Num7, Key::Num8, Key::Num9, Key::Num0,
    Key::NumDot,
    Key::NumEnter,
    Key::NumPlus,
    Key::NumMinus,
    Key::NumAsterisk,
    Key::NumSlash,
    Key::NumLock,
];

const GROUP_KEYS: &[Key] = &[
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
    Key::N1, Key::N2, Key::N3, Key::N4, Key::N5,
    Key::N6, Key::N7, Key::N8, Key::N9, Key::N0,
    Key::Enter,
    Key::Backspace,
    Key::Tab,
    Key::Space,
    Key::Minus,
    Key::Equal,
    Key::OpenBracket,
    Key::CloseBracket,
    Key::Backslash,
    Key::Dollar,
    Key::Semicolon,
    Key::Quote,
    Key::Tilde,
    Key::Comma,
    Key::Period,
    Key::Slash,
    Key::CapsLock,
    Key::IntlBackslash,
];

impl Key {
    /// Raw 16-bit key code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Address group, from the high byte of the code.
    pub fn group(self) -> KeyAddressGroup {
        match self.code() >> 8 {
            0x00 => KeyAddressGroup::Logo,
            0x01 => KeyAddressGroup::Indicators,
            0x02 => KeyAddressGroup::Multimedia,
            0x03 => KeyAddressGroup::GKeys,
            _ => KeyAddressGroup::Keys,
        }
    }

    /// Offset within the address group, from the low byte of the code.
    pub fn offset(self) -> u8 {
        (self.code() & 0xFF) as u8
    }

    /// Whether this is one of the eight modifier keys (ctrl/shift/alt/win).
    pub fn is_modifier(self) -> bool {
        (Key::CtrlLeft..=Key::WinRight).contains(&self)
    }

    /// Whether this key sits on the numeric keypad block.
    pub fn is_numpad(self) -> bool {
        (Key::NumLock..=Key::NumDot).contains(&self)
    }

    /// Every key, grouped the way [`KeyGroup::ALL`] lists them.
    pub fn all() -> impl Iterator<Item = Key> {
        KeyGroup::ALL.iter().flat_map(|g| g.keys().iter().copied())
    }

    /// Parse a key from a CLI-friendly name (case-insensitive).
    ///
    /// Accepts the short and long spellings users type, e.g. "esc" and
    /// "escape", "play" and "play_pause", "num." and "num_dot".
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let name = lower.as_str();

        if let [c] = name.as_bytes() {
            return match c {
                b'a'..=b'z' => Some(LETTERS[usize::from(c - b'a')]),
                b'0'..=b'9' => Some(DIGITS[usize::from(c - b'0')]),
                _ => None,
            };
        }
        if let Some(n) = name.strip_prefix("num").and_then(single_digit) {
            return Some(NUMPAD_DIGITS[n]);
        }
        if let Some(n) = name.strip_prefix('f').and_then(|s| s.parse::<usize>().ok()) {
            return GROUP_FKEYS.get(n.checked_sub(1)?).copied();
        }
        if let Some(n) = name.strip_prefix('g').and_then(single_digit) {
            return GROUP_GKEYS.get(n.checked_sub(1)?).copied();
        }

        let key = match name {
            "logo" => Key::Logo,
            "logo2" => Key::Logo2,
            "back_light" | "backlight" | "light" => Key::Backlight,
            "game_mode" | "gamemode" | "game" => Key::Game,
            "caps_indicator" | "capsindicator" | "caps" => Key::Caps,
            "scroll_indicator" | "scrollindicator" | "scroll" => Key::Scroll,
            "num_indicator" | "numindicator" | "num" => Key::Num,
            "next" => Key::Next,
            "previous" | "prev" => Key::Prev,
            "stop" => Key::Stop,
            "play_pause" | "playpause" | "play" => Key::Play,
            "mute" => Key::Mute,
            "enter" => Key::Enter,
            "escape" | "esc" => Key::Esc,
            "backspace" | "back" => Key::Backspace,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "minus" => Key::Minus,
            "equal" => Key::Equal,
            "open_bracket" => Key::OpenBracket,
            "close_bracket" => Key::CloseBracket,
            "backslash" => Key::Backslash,
            "dollar" => Key::Dollar,
            "semicolon" => Key::Semicolon,
            "quote" => Key::Quote,
            "tilde" => Key::Tilde,
            "comma" => Key::Comma,
            "period" => Key::Period,
            "slash" => Key::Slash,
            "caps_lock" | "capslock" => Key::CapsLock,
            "print_screen" | "printscreen" | "printscr" => Key::PrintScreen,
            "scroll_lock" | "scrolllock" => Key::ScrollLock,
            "pause_break" | "pausebreak" => Key::PauseBreak,
            "insert" | "ins" => Key::Insert,
            "home" => Key::Home,
            "page_up" | "pageup" => Key::PageUp,
            "delete" | "del" => Key::Delete,
            "end" => Key::End,
            "page_down" | "pagedown" => Key::PageDown,
            "arrow_right" | "arrowright" | "right" => Key::ArrowRight,
            "arrow_left" | "arrowleft" | "left" => Key::ArrowLeft,
            "arrow_bottom" | "arrowbottom" | "bottom" => Key::ArrowBottom,
            "arrow_top" | "arrowtop" | "top" => Key::ArrowTop,
            "num_lock" | "numlock" => Key::NumLock,
            "num_slash" | "numslash" | "num/" => Key::NumSlash,
            "num_asterisk" | "numasterisk" | "num*" => Key::NumAsterisk,
            "num_minus" | "numminus" | "num-" => Key::NumMinus,
            "num_plus" | "numplus" | "num+" => Key::NumPlus,
            "num_enter" | "numenter" => Key::NumEnter,
            "num_dot" | "numdot" | "num." => Key::NumDot,
            "intl_backslash" => Key::IntlBackslash,
            "menu" => Key::Menu,
            "ctrl_left" | "ctrlleft" | "ctrll" => Key::CtrlLeft,
            "shift_left" | "shiftleft" | "shiftl" => Key::ShiftLeft,
            "alt_left" | "altleft" | "altl" => Key::AltLeft,
            "win_left" | "winleft" | "winl" => Key::WinLeft,
            "ctrl_right" | "ctrlright" | "ctrlr" => Key::CtrlRight,
            "shift_right" | "shiftright" | "shiftr" => Key::ShiftRight,
            "alt_right" | "altright" | "altr" | "altgr" => Key::AltRight,
            "win_right" | "winright" | "winr" => Key::WinRight,
            _ => return None,
        };
        Some(key)
    }
}

fn single_digit(s: &str) -> Option<usize> {
    match s.as_bytes() {
        [d @ b'0'..=b'9'] => Some(usize::from(d - b'0')),
        _ => None,
    }
}

/// Named logical grouping of keys used for bulk operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyGroup {
    Logo,
    Indicators,
    GKeys,
    FKeys,
    Modifiers,
    Multimedia,
    Arrows,
    Numeric,
    Functions,
    Keys,
}

impl KeyGroup {
    /// All groups, in the order `setAllKeys` assigns them.
    pub const ALL: &'static [KeyGroup] = &[
        KeyGroup::Logo,
        KeyGroup::Indicators,
        KeyGroup::Multimedia,
        KeyGroup::GKeys,
        KeyGroup::FKeys,
        KeyGroup::Functions,
        KeyGroup::Arrows,
        KeyGroup::Numeric,
        KeyGroup::Modifiers,
        KeyGroup::Keys,
    ];

    /// The fixed, ordered key set of this group.
    pub fn keys(self) -> &'static [Key] {
        match self {
            Self::Logo => GROUP_LOGO,
            Self::Indicators => GROUP_INDICATORS,
            Self::GKeys => GROUP_GKEYS,
            Self::FKeys => GROUP_FKEYS,
            Self::Modifiers => GROUP_MODIFIERS,
            Self::Multimedia => GROUP_MULTIMEDIA,
            Self::Arrows => GROUP_ARROWS,
            Self::Numeric => GROUP_NUMERIC,
            Self::Functions => GROUP_FUNCTIONS,
            Self::Keys => GROUP_KEYS,
        }
    }

    /// Parse a group name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "logo" => Some(Self::Logo),
            "indicators" => Some(Self::Indicators),
            "gkeys" => Some(Self::GKeys),
            "fkeys" => Some(Self::FKeys),
            "modifiers" => Some(Self::Modifiers),
            "multimedia" => Some(Self::Multimedia),
            "arrows" => Some(Self::Arrows),
            "numeric" => Some(Self::Numeric),
            "functions" => Some(Self::Functions),
            "keys" => Some(Self::Keys),
            _ => None,
        }
    }
}

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const CYAN: Color = Color::new(0x00, 0xFF, 0xFF);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Channels in wire order.
    pub fn rgb(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Sort key used when batching keys by color: red in the low byte.
    pub fn batch_key(self) -> u32 {
        u32::from(self.red) | u32::from(self.green) << 8 | u32::from(self.blue) << 16
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// A key paired with the color it should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyColor {
    pub key: Key,
    pub color: Color,
}

impl KeyColor {
    pub fn new(key: Key, color: Color) -> Self {
        Self { key, color }
    }
}
