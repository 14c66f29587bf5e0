pub type Keysym = u32;

pub const XK_ESCAPE: Keysym = 0xff1b;
pub const XK_RETURN: Keysym = 0xff0d;
pub const XK_SPACE: Keysym = 0x0020;
pub const XK_TAB: Keysym = 0xff09;
pub const XK_BACKSPACE: Keysym = 0xff08;
pub const XK_DELETE: Keysym = 0xffff;
pub const XK_PRINT: Keysym = 0xff61;
pub const XK_F1: Keysym = 0xffbe;
pub const XK_F12: Keysym = 0xffc9;
pub const XK_A: Keysym = 0x0061;
pub const XK_Z: Keysym = 0x007a;
pub const XK_0: Keysym = 0x0030;
pub const XK_9: Keysym = 0x0039;
pub const XK_LEFT: Keysym = 0xff51;
pub const XK_UP: Keysym = 0xff52;
pub const XK_RIGHT: Keysym = 0xff53;
pub const XK_DOWN: Keysym = 0xff54;
pub const XK_HOME: Keysym = 0xff50;
pub const XK_END: Keysym = 0xff57;
pub const XK_PAGE_UP: Keysym = 0xff55;
pub const XK_PAGE_DOWN: Keysym = 0xff56;
pub const XK_MINUS: Keysym = 0x002d;
pub const XK_EQUAL: Keysym = 0x003d;
pub const XK_COMMA: Keysym = 0x002c;
pub const XK_PERIOD: Keysym = 0x002e;
pub const XK_SLASH: Keysym = 0x002f;
pub const XK_SEMICOLON: Keysym = 0x003b;

pub const XF86_AUDIO_RAISE_VOLUME: Keysym = 0x1008ff13;
pub const XF86_AUDIO_LOWER_VOLUME: Keysym = 0x1008ff11;
pub const XF86_AUDIO_MUTE: Keysym = 0x1008ff12;
pub const XF86_MON_BRIGHTNESS_UP: Keysym = 0x1008ff02;
pub const XF86_MON_BRIGHTNESS_DOWN: Keysym = 0x1008ff03;

const NAMED: [(&str, Keysym); 22] = [
    ("Escape", XK_ESCAPE),
    ("Return", XK_RETURN),
    ("space", XK_SPACE),
    ("Tab", XK_TAB),
    ("BackSpace", XK_BACKSPACE),
    ("Delete", XK_DELETE),
    ("Print", XK_PRINT),
    ("Left", XK_LEFT),
    ("Up", XK_UP),
    ("Right", XK_RIGHT),
    ("Down", XK_DOWN),
    ("Home", XK_HOME),
    ("End", XK_END),
    ("Prior", XK_PAGE_UP),
    ("Next", XK_PAGE_DOWN),
    ("minus", XK_MINUS),
    ("equal", XK_EQUAL),
    ("comma", XK_COMMA),
    ("period", XK_PERIOD),
    ("slash", XK_SLASH),
    ("semicolon", XK_SEMICOLON),
    ("XF86AudioMute", XF86_AUDIO_MUTE),
];

const MEDIA: [(&str, Keysym); 4] = [
    ("XF86AudioRaiseVolume", XF86_AUDIO_RAISE_VOLUME),
    ("XF86AudioLowerVolume", XF86_AUDIO_LOWER_VOLUME),
    ("XF86MonBrightnessUp", XF86_MON_BRIGHTNESS_UP),
    ("XF86MonBrightnessDown", XF86_MON_BRIGHTNESS_DOWN),
];

/// Look up a keysym by its X name: `a`, `Return`, `F4`, `comma`, `XF86AudioMute`.
/// Single letters are case-insensitive.
pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    if let Some((_, keysym)) = NAMED.iter().chain(MEDIA.iter()).find(|(n, _)| *n == name) {
        return Some(*keysym);
    }

    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            return Some(ch as Keysym);
        }
    }

    let number: u32 = name.strip_prefix('F')?.parse().ok()?;
    (1..=12).contains(&number).then(|| XK_F1 + number - 1)
}

pub fn format_keysym(keysym: Keysym) -> String {
    if let Some((name, _)) = NAMED.iter().chain(MEDIA.iter()).find(|(_, k)| *k == keysym) {
        return name.to_string();
    }
    match keysym {
        XK_F1..=XK_F12 => format!("F{}", keysym - XK_F1 + 1),
        XK_A..=XK_Z | XK_0..=XK_9 => (keysym as u8 as char).to_string(),
        _ => format!("0x{:x}", keysym),
    }
}
