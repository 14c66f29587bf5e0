pub mod attach;
pub mod client;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod keyboard;
pub mod layout;
pub mod monitor;
pub mod pertag;
pub mod rules;
pub mod signal;
pub mod size_hints;
pub mod tags;
pub mod util;
pub mod window_manager;
pub mod x;

pub mod prelude {
    pub use crate::attach::AttachMode;
    pub use crate::keyboard::{Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding, keysyms};
    pub use crate::layout::{GapConfig, LayoutType};
    pub use crate::rules::{Rule, SwitchTag};
    pub use x11rb::protocol::xproto::KeyButMask;
}

use crate::attach::AttachMode;
use crate::keyboard::keysyms::{self, Keysym};
use crate::keyboard::{Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding};
use crate::layout::{GapConfig, LayoutType};
use crate::pertag::TagRule;
use crate::rules::{Rule, SwitchTag};
use crate::tags::{ALL_TAGS, TAG_COUNT, scratchpad_tag, tag_bit};
use x11rb::protocol::xproto::KeyButMask;

/// Exit code asking the session wrapper to start the window manager again.
pub const EXIT_RESTART: i32 = 100;
pub const EXIT_POWEROFF: i32 = 101;
pub const EXIT_REBOOT: i32 = 102;

/// A command kept on a hidden tag and summoned with `togglescratch`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scratchpad {
    /// Instance name the rules match the scratchpad window by.
    pub name: String,
    pub command: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Appearance
    pub border_width: i32,
    pub snap: i32,
    pub normal_border: u32,
    pub selected_border: u32,
    /// Border of a selected tiled client that is alone on screen.
    pub selected_alone_border: u32,

    // Gaps
    pub gaps: GapConfig,
    pub smart_gaps: bool,

    // Bar reservation
    pub show_bar: bool,
    pub top_bar: bool,
    pub bar_height: i32,

    // Layout
    pub attach_mode: AttachMode,
    pub master_factor: f32,
    pub num_master: usize,
    pub layouts: [LayoutType; 2],
    pub resize_hints: bool,
    pub force_vsplit: bool,

    // Behaviour
    pub focus_on_wheel: bool,
    pub swallow_floating: bool,

    // Basics
    pub terminal: String,
    pub modkey: KeyButMask,
    pub tags: Vec<String>,

    pub rules: Vec<Rule>,
    pub scratchpads: Vec<Scratchpad>,
    pub tag_rules: Vec<TagRule>,

    pub keybindings: Vec<KeyBinding>,
    pub buttons: Vec<ButtonBinding>,
    pub autostart: Vec<String>,
}

fn argv(words: &[&str]) -> Arg {
    Arg::Array(words.iter().map(|w| w.to_string()).collect())
}

fn shell(command: &str) -> Arg {
    argv(&["sh", "-c", command])
}

fn key(character: char) -> Keysym {
    character as Keysym
}

fn default_rules() -> Vec<Rule> {
    vec![
        Rule::title("LibreOffice").tags(tag_bit(3)).switch_tag(SwitchTag::View).no_swallow(),
        Rule::title("Soffice").tags(tag_bit(3)).switch_tag(SwitchTag::View).no_swallow(),
        Rule::instance("soffice").tags(tag_bit(3)).switch_tag(SwitchTag::View).no_swallow(),
        Rule::class("Thunar").tags(tag_bit(2)).switch_tag(SwitchTag::View).no_swallow(),
        Rule::class("Gimp").tags(tag_bit(5)).switch_tag(SwitchTag::View).no_swallow(),
        Rule::class("firefox").no_swallow(),
        Rule::class("Chromium").no_swallow(),
        Rule::class("mpv"),
        Rule::class("st-256color").terminal(),
        Rule::title("Event Tester").no_swallow(),
        Rule::class("Dragon-drop").floating().no_swallow(),
        Rule::class("Gnome-calculator").floating(),
        Rule::class("Galculator").floating(),
        Rule::class("Pavucontrol").floating(),
        Rule::class("flameshot").floating(),
        Rule::class("Yad").floating(),
        Rule::instance("spterm").tags(scratchpad_tag(0)).floating(),
        Rule::instance("spfm").tags(scratchpad_tag(1)).floating(),
        Rule::class("Qalculate-gtk").tags(scratchpad_tag(2)).floating(),
    ]
}

fn default_scratchpads() -> Vec<Scratchpad> {
    let words = |w: &[&str]| w.iter().map(|s| s.to_string()).collect();
    vec![
        Scratchpad {
            name: "spterm".to_string(),
            command: words(&["st", "-n", "spterm", "-g", "124x34"]),
        },
        Scratchpad {
            name: "spfm".to_string(),
            command: words(&["st", "-n", "spfm", "-g", "142x40", "-e", "lf - File Manager"]),
        },
        Scratchpad {
            name: "spcalc".to_string(),
            command: words(&["qalculate-gtk"]),
        },
    ]
}

fn default_keybindings(modkey: KeyButMask, terminal: &str) -> Vec<KeyBinding> {
    use KeyAction::*;
    use keysyms::*;

    const SHIFT: KeyButMask = KeyButMask::SHIFT;
    const CONTROL: KeyButMask = KeyButMask::CONTROL;
    const ALT: KeyButMask = KeyButMask::MOD1;
    let m = modkey;

    let mut keys = vec![
        KeyBinding::new(vec![m], key('d'), Spawn, argv(&["rofi-launcher"])),
        KeyBinding::new(vec![m, SHIFT], key('d'), Spawn, argv(&["rofi-find"])),
        KeyBinding::new(vec![m], key('p'), Spawn, argv(&["dmenu_run"])),
        KeyBinding::new(vec![m, SHIFT], key('e'), Spawn, argv(&["thunar"])),
        KeyBinding::new(vec![m], XK_RETURN, Spawn, argv(&[terminal])),
        KeyBinding::new(vec![m], key('w'), Spawn, argv(&["chromium"])),
        KeyBinding::new(vec![m, CONTROL], key('w'), Spawn, argv(&["firefox"])),
        KeyBinding::new(
            vec![m, CONTROL, SHIFT],
            key('w'),
            Spawn,
            argv(&["firefox", "--private-window"]),
        ),
        KeyBinding::new(vec![m], key('v'), Spawn, shell("ytmpv")),
        KeyBinding::new(vec![m], key('b'), ToggleBar, Arg::None),
        KeyBinding::new(vec![m], key('j'), FocusStack, Arg::Int(1)),
        KeyBinding::new(vec![m], key('k'), FocusStack, Arg::Int(-1)),
        KeyBinding::new(vec![ALT], key('j'), FocusStackHidden, Arg::Int(1)),
        KeyBinding::new(vec![ALT], key('k'), FocusStackHidden, Arg::Int(-1)),
        KeyBinding::new(vec![m], XK_LEFT, FocusDirection, Arg::Int(0)),
        KeyBinding::new(vec![m], XK_RIGHT, FocusDirection, Arg::Int(1)),
        KeyBinding::new(vec![m], XK_UP, FocusDirection, Arg::Int(2)),
        KeyBinding::new(vec![m], XK_DOWN, FocusDirection, Arg::Int(3)),
        KeyBinding::new(vec![m, SHIFT], key('j'), PushClient, Arg::Int(1)),
        KeyBinding::new(vec![m, SHIFT], key('k'), PushClient, Arg::Int(-1)),
        KeyBinding::new(vec![m, SHIFT], key('h'), InplaceRotate, Arg::Int(1)),
        KeyBinding::new(vec![m, SHIFT], key('l'), InplaceRotate, Arg::Int(-1)),
        KeyBinding::new(vec![m, CONTROL, SHIFT], key('h'), InplaceRotate, Arg::Int(2)),
        KeyBinding::new(vec![m, CONTROL, SHIFT], key('l'), InplaceRotate, Arg::Int(-2)),
        KeyBinding::new(vec![m, SHIFT], XK_DOWN, MoveResize, Arg::Str("0x 25y 0w 0h".into())),
        KeyBinding::new(vec![m, SHIFT], XK_UP, MoveResize, Arg::Str("0x -25y 0w 0h".into())),
        KeyBinding::new(vec![m, SHIFT], XK_RIGHT, MoveResize, Arg::Str("25x 0y 0w 0h".into())),
        KeyBinding::new(vec![m, SHIFT], XK_LEFT, MoveResize, Arg::Str("-25x 0y 0w 0h".into())),
        KeyBinding::new(vec![m, CONTROL], XK_DOWN, MoveResize, Arg::Str("0x 0y 0w 25h".into())),
        KeyBinding::new(vec![m, CONTROL], XK_UP, MoveResize, Arg::Str("0x 0y 0w -25h".into())),
        KeyBinding::new(vec![m, CONTROL], XK_RIGHT, MoveResize, Arg::Str("0x 0y 25w 0h".into())),
        KeyBinding::new(vec![m, CONTROL], XK_LEFT, MoveResize, Arg::Str("0x 0y -25w 0h".into())),
        KeyBinding::new(vec![m, CONTROL, SHIFT], XK_UP, MoveResizeEdge, Arg::Str("t".into())),
        KeyBinding::new(vec![m, CONTROL, SHIFT], XK_DOWN, MoveResizeEdge, Arg::Str("b".into())),
        KeyBinding::new(vec![m, CONTROL, SHIFT], XK_LEFT, MoveResizeEdge, Arg::Str("l".into())),
        KeyBinding::new(vec![m, CONTROL, SHIFT], XK_RIGHT, MoveResizeEdge, Arg::Str("r".into())),
        KeyBinding::new(vec![m, ALT], XK_UP, AspectResize, Arg::Int(-25)),
        KeyBinding::new(vec![m, ALT], XK_LEFT, AspectResize, Arg::Int(-25)),
        KeyBinding::new(vec![m, ALT], XK_DOWN, AspectResize, Arg::Int(25)),
        KeyBinding::new(vec![m, ALT], XK_RIGHT, AspectResize, Arg::Int(25)),
        KeyBinding::new(vec![m], key('m'), IncNumMaster, Arg::Int(1)),
        KeyBinding::new(vec![m, SHIFT], key('m'), IncNumMaster, Arg::Int(-1)),
        KeyBinding::new(vec![m, CONTROL], key('h'), SetMasterFactor, Arg::Float(-0.05)),
        KeyBinding::new(vec![m, CONTROL], key('l'), SetMasterFactor, Arg::Float(0.05)),
        KeyBinding::new(vec![m, CONTROL], key('j'), SetClientFactor, Arg::Float(-0.25)),
        KeyBinding::new(vec![m, CONTROL], key('k'), SetClientFactor, Arg::Float(0.25)),
        KeyBinding::new(vec![m, CONTROL], key('n'), SetClientFactor, Arg::Float(0.0)),
        KeyBinding::new(vec![m, SHIFT], XK_SPACE, Zoom, Arg::None),
        KeyBinding::new(vec![m], XK_SPACE, ZoomSwap, Arg::None),
        KeyBinding::new(vec![m], key('z'), IncGaps, Arg::Int(2)),
        KeyBinding::new(vec![m, SHIFT], key('z'), IncGaps, Arg::Int(-2)),
        KeyBinding::new(vec![m, CONTROL], key('z'), DefaultGaps, Arg::None),
        KeyBinding::new(vec![m], key('a'), ToggleGaps, Arg::None),
        KeyBinding::new(vec![m], XK_TAB, View, Arg::UInt(0)),
        KeyBinding::new(vec![ALT], XK_TAB, ShiftViewClients, Arg::Int(1)),
        KeyBinding::new(vec![ALT, SHIFT], XK_TAB, ShiftViewClients, Arg::Int(-1)),
        KeyBinding::new(vec![m, SHIFT], key('q'), KillClient, Arg::None),
        KeyBinding::new(vec![m, CONTROL], XK_COMMA, CycleLayout, Arg::Int(-1)),
        KeyBinding::new(vec![m, CONTROL], XK_PERIOD, CycleLayout, Arg::Int(1)),
        KeyBinding::new(vec![m], key('u'), SetLayout, Arg::Layout(LayoutType::Tile)),
        KeyBinding::new(vec![m, SHIFT], key('u'), SetLayout, Arg::Layout(LayoutType::BottomStack)),
        KeyBinding::new(vec![m, CONTROL], key('u'), SetLayout, Arg::Layout(LayoutType::NRowGrid)),
        KeyBinding::new(vec![m], key('i'), SetLayout, Arg::Layout(LayoutType::Monocle)),
        KeyBinding::new(vec![m, SHIFT], key('i'), SetLayout, Arg::Layout(LayoutType::Deck)),
        KeyBinding::new(
            vec![m, CONTROL],
            key('i'),
            SetLayout,
            Arg::Layout(LayoutType::CenteredMaster),
        ),
        KeyBinding::new(vec![m, SHIFT], key('g'), SetLayout, Arg::Layout(LayoutType::Float)),
        KeyBinding::new(vec![m], XK_F1, CycleAttach, Arg::Int(1)),
        KeyBinding::new(vec![m, SHIFT], XK_F1, CycleAttach, Arg::Int(-1)),
        KeyBinding::new(vec![m], key('g'), ToggleFloating, Arg::None),
        KeyBinding::new(vec![m, SHIFT], key('s'), ToggleSticky, Arg::None),
        KeyBinding::new(vec![m], key('f'), ToggleFullScreen, Arg::None),
        KeyBinding::new(vec![m, SHIFT], key('f'), ToggleFakeFullScreen, Arg::None),
        KeyBinding::new(vec![m], keysyms::XK_0, View, Arg::UInt(ALL_TAGS)),
        KeyBinding::new(vec![m, SHIFT], keysyms::XK_0, Tag, Arg::UInt(ALL_TAGS)),
        KeyBinding::new(vec![m], XK_COMMA, FocusMonitor, Arg::Int(-1)),
        KeyBinding::new(vec![m], XK_PERIOD, FocusMonitor, Arg::Int(1)),
        KeyBinding::new(vec![m, SHIFT], XK_COMMA, TagMonitor, Arg::Int(-1)),
        KeyBinding::new(vec![m, SHIFT], XK_PERIOD, TagMonitor, Arg::Int(1)),
        KeyBinding::new(vec![m], key('x'), Hide, Arg::None),
        KeyBinding::new(vec![m, SHIFT], key('x'), Show, Arg::None),
        KeyBinding::new(vec![m], key('s'), ToggleScratch, Arg::UInt(0)),
        KeyBinding::new(vec![m], key('e'), ToggleScratch, Arg::UInt(1)),
        KeyBinding::new(vec![m], key('c'), ToggleScratch, Arg::UInt(2)),
        KeyBinding::new(vec![m], XK_PRINT, Spawn, argv(&["xfce4-screenshooter"])),
        KeyBinding::new(vec![m, SHIFT], XK_PRINT, Spawn, argv(&["xfce4-screenshooter", "-f"])),
        KeyBinding::new(
            vec![m, ALT],
            XK_PRINT,
            Spawn,
            argv(&["xfce4-screenshooter", "-w", "--no-border"]),
        ),
        KeyBinding::new(vec![m, CONTROL], XK_PRINT, Spawn, argv(&["flameshot", "gui"])),
        KeyBinding::new(vec![m], XK_F1 + 3, Spawn, argv(&["sigdsblocks", "7", "5"])),
        KeyBinding::new(vec![m], XK_F1 + 2, Spawn, argv(&["sigdsblocks", "7", "-5"])),
        KeyBinding::new(vec![m, SHIFT], XK_F1 + 3, Spawn, argv(&["sigdsblocks", "7", "1"])),
        KeyBinding::new(vec![m, SHIFT], XK_F1 + 2, Spawn, argv(&["sigdsblocks", "7", "-1"])),
        KeyBinding::new(vec![], XF86_MON_BRIGHTNESS_UP, Spawn, argv(&["sigdsblocks", "7", "5"])),
        KeyBinding::new(
            vec![],
            XF86_MON_BRIGHTNESS_DOWN,
            Spawn,
            argv(&["sigdsblocks", "7", "-5"]),
        ),
        KeyBinding::new(vec![], XF86_AUDIO_MUTE, Spawn, argv(&["sigdsblocks", "6", "0"])),
        KeyBinding::new(vec![], XF86_AUDIO_RAISE_VOLUME, Spawn, argv(&["sigdsblocks", "6", "5"])),
        KeyBinding::new(vec![], XF86_AUDIO_LOWER_VOLUME, Spawn, argv(&["sigdsblocks", "6", "-5"])),
        KeyBinding::new(vec![m], XK_F1 + 8, Spawn, argv(&["sigdsblocks", "6", "0"])),
        KeyBinding::new(vec![m, SHIFT], XK_F1 + 8, Spawn, argv(&["sigdsblocks", "6", "0"])),
        KeyBinding::new(vec![m], XK_F1 + 10, Spawn, argv(&["sigdsblocks", "6", "5"])),
        KeyBinding::new(vec![m], XK_F1 + 9, Spawn, argv(&["sigdsblocks", "6", "-5"])),
        KeyBinding::new(vec![m, SHIFT], XK_F1 + 10, Spawn, argv(&["sigdsblocks", "6", "1"])),
        KeyBinding::new(vec![m, SHIFT], XK_F1 + 9, Spawn, argv(&["sigdsblocks", "6", "-1"])),
        KeyBinding::new(vec![ALT, CONTROL], key('l'), Spawn, argv(&["dwm-lock", "forcelock"])),
        KeyBinding::new(vec![m, SHIFT, CONTROL], key('r'), Spawn, shell("dwm-restart")),
        KeyBinding::new(vec![ALT, CONTROL], XK_DELETE, Spawn, argv(&["dwm-powermenu"])),
    ];

    for tag in 0..TAG_COUNT {
        let keysym = keysyms::XK_0 + 1 + tag as Keysym;
        let mask = Arg::UInt(tag_bit(tag));
        keys.push(KeyBinding::new(vec![m], keysym, View, mask.clone()));
        keys.push(KeyBinding::new(vec![m, CONTROL], keysym, ToggleView, mask.clone()));
        keys.push(KeyBinding::new(vec![m, SHIFT], keysym, Tag, mask.clone()));
        keys.push(KeyBinding::new(vec![m, CONTROL, SHIFT], keysym, ToggleTag, mask));
    }

    keys
}

fn default_buttons(modkey: KeyButMask) -> Vec<ButtonBinding> {
    use ClickTarget::*;
    use KeyAction::*;

    let m = modkey;
    let shift = KeyButMask::SHIFT;
    vec![
        ButtonBinding::new(ClientWindow, vec![m], 1, MoveMouse, Arg::None),
        ButtonBinding::new(ClientWindow, vec![m], 2, ToggleFloating, Arg::None),
        ButtonBinding::new(ClientWindow, vec![m], 3, ResizeMouse, Arg::None),
        ButtonBinding::new(ClientWindow, vec![m, shift], 1, DragMasterFactor, Arg::None),
        ButtonBinding::new(ClientWindow, vec![m, shift], 3, DragClientFactor, Arg::None),
        ButtonBinding::new(RootWindow, vec![], 3, Spawn, argv(&["xmenu-apps"])),
        ButtonBinding::new(RootWindow, vec![m, shift], 1, DragMasterFactor, Arg::None),
    ]
}

impl Default for Config {
    fn default() -> Self {
        const MODKEY: KeyButMask = KeyButMask::MOD4;
        const TERMINAL: &str = "st";

        Self {
            border_width: 2,
            snap: 20,
            normal_border: 0x404040,
            selected_border: 0xaec2c6,
            selected_alone_border: 0x080808,
            gaps: GapConfig {
                inner_horizontal: 8,
                inner_vertical: 8,
                outer_horizontal: 7,
                outer_vertical: 10,
            },
            smart_gaps: false,
            show_bar: true,
            top_bar: true,
            bar_height: 23,
            attach_mode: AttachMode::Aside,
            master_factor: 0.55,
            num_master: 1,
            layouts: [LayoutType::Tile, LayoutType::Monocle],
            resize_hints: true,
            force_vsplit: true,
            focus_on_wheel: false,
            swallow_floating: false,
            terminal: TERMINAL.to_string(),
            modkey: MODKEY,
            tags: (1..=TAG_COUNT).map(|t| t.to_string()).collect(),
            rules: default_rules(),
            scratchpads: default_scratchpads(),
            tag_rules: vec![TagRule {
                tag: 4,
                layout: LayoutType::Tile,
                master_factor: Some(0.5),
                gaps: Some(GapConfig::uniform(0)),
            }],
            keybindings: default_keybindings(MODKEY, TERMINAL),
            buttons: default_buttons(MODKEY),
            autostart: Vec::new(),
        }
    }
}

impl Config {
    /// Rebuild the default key and button tables around a different modifier.
    pub fn with_modkey(mut self, modkey: KeyButMask) -> Self {
        self.keybindings = default_keybindings(modkey, &self.terminal);
        self.buttons = default_buttons(modkey);
        self.modkey = modkey;
        self
    }
}
