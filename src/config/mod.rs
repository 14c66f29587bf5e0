//! RON user configuration.
//!
//! Every field is optional: anything left out keeps the value from [`Config::default`].
//! Lines of the form `#DEFINE $name = value` declare text substitutions applied to the
//! rest of the file before it is parsed.
use crate::Config;
use crate::Scratchpad;
use crate::attach::AttachMode;
use crate::errors::ConfigError;
use crate::keyboard::keysyms::keysym_from_name;
use crate::keyboard::{Arg, ButtonBinding, ClickTarget, KeyAction, KeyBinding};
use crate::layout::{GapConfig, LayoutType};
use crate::pertag::TagRule;
use crate::rules::Rule;
use crate::tags::{SCRATCHPAD_COUNT, TAG_COUNT};
use ron::extensions::Extensions;
use serde::Deserialize;
use std::collections::HashMap;
use x11rb::protocol::xproto::KeyButMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ModKey {
    /// Whatever `modkey` is set to.
    Mod,
    Mod1,
    Mod2,
    Mod3,
    Mod4,
    Mod5,
    Shift,
    Control,
}

impl ModKey {
    fn to_keybut_mask(self, modkey: KeyButMask) -> KeyButMask {
        match self {
            ModKey::Mod => modkey,
            ModKey::Mod1 => KeyButMask::MOD1,
            ModKey::Mod2 => KeyButMask::MOD2,
            ModKey::Mod3 => KeyButMask::MOD3,
            ModKey::Mod4 => KeyButMask::MOD4,
            ModKey::Mod5 => KeyButMask::MOD5,
            ModKey::Shift => KeyButMask::SHIFT,
            ModKey::Control => KeyButMask::CONTROL,
        }
    }
}

fn preprocess_variables(input: &str) -> Result<String, ConfigError> {
    let mut variables: HashMap<String, String> = HashMap::new();
    let mut result = String::new();

    for line in input.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("#DEFINE") {
            let rest = rest.trim();
            let Some((var_name, value)) = rest.split_once('=') else {
                return Err(ConfigError::InvalidDefine(trimmed.to_string()));
            };
            let var_name = var_name.trim();
            let value = value.trim().trim_end_matches(',');

            if !var_name.starts_with('$') {
                return Err(ConfigError::InvalidVariableName(var_name.to_string()));
            }

            variables.insert(var_name.to_string(), value.to_string());
            result.push('\n');
        } else {
            let mut processed_line = line.to_string();
            // longest names first so `$mod` never eats the front of `$modshift`
            let mut names: Vec<&String> = variables.keys().collect();
            names.sort_by_key(|name| std::cmp::Reverse(name.len()));
            for var_name in names {
                processed_line = processed_line.replace(var_name.as_str(), &variables[var_name]);
            }
            result.push_str(&processed_line);
            result.push('\n');
        }
    }

    for line in result.lines() {
        if let Some(var_start) = line.find('$') {
            let rest = &line[var_start..];
            let var_end = rest[1..]
                .find(|c: char| !c.is_alphanumeric() && c != '_')
                .unwrap_or(rest.len() - 1)
                + 1;
            let undefined_var = &rest[..var_end];
            return Err(ConfigError::UndefinedVariable(undefined_var.to_string()));
        }
    }
    Ok(result)
}

/// Commented starting point written out by `flexwm --init`.
pub const TEMPLATE: &str = include_str!("../../templates/config.ron");

pub fn parse_config(input: &str) -> Result<Config, ConfigError> {
    let preprocessed = preprocess_variables(input)?;
    let config_data: ConfigData = ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(&preprocessed)?;
    config_data_to_config(config_data)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigData {
    border_width: Option<i32>,
    snap: Option<i32>,
    normal_border: Option<u32>,
    selected_border: Option<u32>,
    selected_alone_border: Option<u32>,

    gaps: Option<GapConfig>,
    smart_gaps: Option<bool>,

    show_bar: Option<bool>,
    top_bar: Option<bool>,
    bar_height: Option<i32>,

    attach_mode: Option<String>,
    master_factor: Option<f32>,
    num_master: Option<usize>,
    layouts: Option<Vec<String>>,
    resize_hints: Option<bool>,
    force_vsplit: Option<bool>,

    focus_on_wheel: Option<bool>,
    swallow_floating: Option<bool>,

    terminal: Option<String>,
    modkey: Option<ModKey>,
    tags: Option<Vec<String>>,

    rules: Option<Vec<Rule>>,
    scratchpads: Option<Vec<ScratchpadData>>,
    tag_rules: Option<Vec<TagRuleData>>,

    keybindings: Option<Vec<KeybindingData>>,
    buttons: Option<Vec<ButtonData>>,
    autostart: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ScratchpadData {
    name: String,
    command: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagRuleData {
    tag: usize,
    layout: String,
    #[serde(default)]
    master_factor: Option<f32>,
    #[serde(default)]
    gaps: Option<GapConfig>,
}

#[derive(Debug, Deserialize)]
struct KeybindingData {
    #[serde(default)]
    modifiers: Vec<ModKey>,
    key: String,
    action: KeyAction,
    #[serde(default)]
    arg: ArgData,
}

#[derive(Debug, Deserialize)]
struct ButtonData {
    target: ClickTarget,
    #[serde(default)]
    modifiers: Vec<ModKey>,
    button: u8,
    action: KeyAction,
    #[serde(default)]
    arg: ArgData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum ArgData {
    #[default]
    None,
    Int(i32),
    Float(f32),
    String(String),
    Array(Vec<String>),
}

fn config_data_to_config(data: ConfigData) -> Result<Config, ConfigError> {
    let defaults = Config::default();
    let modkey = match data.modkey {
        Some(ModKey::Mod) => return Err(ConfigError::InvalidModkey("Mod".to_string())),
        Some(key) => key.to_keybut_mask(defaults.modkey),
        None => defaults.modkey,
    };
    let terminal = data.terminal.unwrap_or(defaults.terminal.clone());
    let mut config = Config {
        terminal,
        ..defaults
    }
    .with_modkey(modkey);

    if let Some(tags) = data.tags {
        if tags.len() != TAG_COUNT {
            return Err(ConfigError::TagCount {
                expected: TAG_COUNT,
                found: tags.len(),
            });
        }
        config.tags = tags;
    }

    if let Some(mode) = data.attach_mode {
        config.attach_mode = mode
            .parse::<AttachMode>()
            .map_err(|_| ConfigError::UnknownAttachMode(mode))?;
    }

    if let Some(names) = data.layouts {
        let mut layouts = config.layouts;
        for (slot, name) in names.iter().take(2).enumerate() {
            layouts[slot] = parse_layout(name)?;
        }
        config.layouts = layouts;
    }

    if let Some(pads) = data.scratchpads {
        if pads.len() > SCRATCHPAD_COUNT {
            return Err(ConfigError::TooManyScratchpads {
                max: SCRATCHPAD_COUNT,
                found: pads.len(),
            });
        }
        config.scratchpads = pads
            .into_iter()
            .map(|pad| Scratchpad {
                name: pad.name,
                command: pad.command,
            })
            .collect();
    }

    if let Some(rules) = data.tag_rules {
        config.tag_rules = rules
            .into_iter()
            .map(|rule| {
                if !(1..=TAG_COUNT).contains(&rule.tag) {
                    return Err(ConfigError::InvalidTagRule(rule.tag));
                }
                Ok(TagRule {
                    tag: rule.tag,
                    layout: parse_layout(&rule.layout)?,
                    master_factor: rule.master_factor,
                    gaps: rule.gaps,
                })
            })
            .collect::<Result<_, _>>()?;
    }

    if let Some(keys) = data.keybindings {
        config.keybindings = keys
            .into_iter()
            .map(|kb| {
                let keysym =
                    keysym_from_name(&kb.key).ok_or_else(|| ConfigError::UnknownKey(kb.key))?;
                let modifiers = kb.modifiers.iter().map(|m| m.to_keybut_mask(modkey)).collect();
                Ok(KeyBinding::new(
                    modifiers,
                    keysym,
                    kb.action,
                    arg_data_to_arg(kb.action, kb.arg)?,
                ))
            })
            .collect::<Result<_, ConfigError>>()?;
    }

    if let Some(buttons) = data.buttons {
        config.buttons = buttons
            .into_iter()
            .map(|b| {
                let modifiers = b.modifiers.iter().map(|m| m.to_keybut_mask(modkey)).collect();
                Ok(ButtonBinding::new(
                    b.target,
                    modifiers,
                    b.button,
                    b.action,
                    arg_data_to_arg(b.action, b.arg)?,
                ))
            })
            .collect::<Result<_, ConfigError>>()?;
    }

    macro_rules! override_fields {
        ($($field:ident),* $(,)?) => {
            $(if let Some(value) = data.$field {
                config.$field = value;
            })*
        };
    }
    override_fields!(
        border_width,
        snap,
        normal_border,
        selected_border,
        selected_alone_border,
        gaps,
        smart_gaps,
        show_bar,
        top_bar,
        bar_height,
        master_factor,
        num_master,
        resize_hints,
        force_vsplit,
        focus_on_wheel,
        swallow_floating,
        rules,
        autostart,
    );
    config.master_factor = config.master_factor.clamp(0.05, 0.95);

    Ok(config)
}

fn parse_layout(name: &str) -> Result<LayoutType, ConfigError> {
    name.parse()
        .map_err(|_| ConfigError::UnknownLayout(name.to_string()))
}

/// Strings name a layout or attach mode for the actions that take one, and a single
/// command line for `Spawn`.
fn arg_data_to_arg(action: KeyAction, data: ArgData) -> Result<Arg, ConfigError> {
    match (action, data) {
        (_, ArgData::None) => Ok(Arg::None),
        (KeyAction::SetLayout, ArgData::String(name)) => Ok(Arg::Layout(parse_layout(&name)?)),
        (KeyAction::SetAttach, ArgData::String(name)) => name
            .parse()
            .map(Arg::Attach)
            .map_err(|_| ConfigError::UnknownAttachMode(name)),
        (KeyAction::Spawn, ArgData::String(command)) => Ok(Arg::Array(vec![
            "sh".to_string(),
            "-c".to_string(),
            command,
        ])),
        (_, ArgData::String(s)) => Ok(Arg::Str(s)),
        (_, ArgData::Int(n)) => Ok(Arg::Int(n)),
        (_, ArgData::Float(f)) => Ok(Arg::Float(f)),
        (_, ArgData::Array(arr)) => Ok(Arg::Array(arr)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::keysyms::XK_RETURN;
    use simple_test_case::test_case;

    #[test]
    fn empty_config_is_the_default() {
        let config = parse_config("()").unwrap();
        let defaults = Config::default();

        assert_eq!(config.border_width, defaults.border_width);
        assert_eq!(config.gaps, defaults.gaps);
        assert_eq!(config.keybindings, defaults.keybindings);
        assert_eq!(config.rules, defaults.rules);
    }

    #[test]
    fn fields_override_defaults() {
        let config = parse_config(
            r#"(
                border_width: 4,
                gaps: (inner_horizontal: 1, inner_vertical: 2, outer_horizontal: 3, outer_vertical: 4),
                attach_mode: "bottom",
                layouts: ["monocle", "deck"],
                tag_rules: [(tag: 2, layout: "grid", master_factor: 0.7)],
            )"#,
        )
        .unwrap();

        assert_eq!(config.border_width, 4);
        assert_eq!(config.gaps.outer_vertical, 4);
        assert_eq!(config.attach_mode, AttachMode::Bottom);
        assert_eq!(config.layouts, [LayoutType::Monocle, LayoutType::Deck]);
        assert_eq!(config.tag_rules[0].layout, LayoutType::Grid);
        assert_eq!(config.tag_rules[0].master_factor, Some(0.7));
    }

    #[test]
    fn keybindings_resolve_names_and_mod() {
        let config = parse_config(
            r#"
            #DEFINE $term = "alacritty",
            (
                modkey: Mod1,
                keybindings: [
                    (modifiers: [Mod, Shift], key: "Return", action: Spawn, arg: $term),
                    (modifiers: [Mod], key: "u", action: SetLayout, arg: "tile"),
                    (modifiers: [Mod], key: "j", action: FocusStack, arg: 1),
                ],
            )"#,
        )
        .unwrap();

        let spawn = &config.keybindings[0];
        assert_eq!(spawn.keysym, XK_RETURN);
        assert_eq!(spawn.modifiers, vec![KeyButMask::MOD1, KeyButMask::SHIFT]);
        assert_eq!(
            spawn.arg,
            Arg::Array(vec!["sh".into(), "-c".into(), "alacritty".into()])
        );
        assert_eq!(config.keybindings[1].arg, Arg::Layout(LayoutType::Tile));
        assert_eq!(config.keybindings[2].arg, Arg::Int(1));
    }

    #[test]
    fn default_buttons_follow_modkey() {
        let config = parse_config("(modkey: Mod1)").unwrap();

        assert!(config.buttons[0].modifiers.contains(&KeyButMask::MOD1));
    }

    #[test]
    fn rules_parse_with_optional_fields() {
        let config = parse_config(
            r#"(rules: [(class: "mpv", is_floating: true), (instance: "st", is_terminal: true, switch_tag: view)])"#,
        )
        .unwrap();

        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].class.as_deref(), Some("mpv"));
        assert!(config.rules[0].is_floating);
        assert_eq!(config.rules[0].monitor, -1);
        assert!(config.rules[1].is_terminal);
    }

    #[test_case("(tags: [\"a\"])"; "wrong tag count")]
    #[test_case("(layouts: [\"spiralish\"])"; "unknown layout")]
    #[test_case("(attach_mode: \"sideways\")"; "unknown attach mode")]
    #[test_case("(tag_rules: [(tag: 12, layout: \"tile\")])"; "tag rule out of range")]
    #[test_case("(keybindings: [(key: \"Hyper\", action: Zoom)])"; "unknown key")]
    #[test_case("(modkey: Mod)"; "modkey cannot be Mod")]
    #[test_case("(border_width: $width)"; "undefined variable")]
    #[test_case("#DEFINE width = 3\n()"; "variable without dollar")]
    #[test_case("#DEFINE $width\n()"; "define without value")]
    #[test]
    fn invalid_configs_are_rejected(input: &str) {
        assert!(parse_config(input).is_err());
    }

    #[test]
    fn longer_variables_are_substituted_first() {
        let processed =
            preprocess_variables("#DEFINE $m = 1\n#DEFINE $mm = 2\n($mm, $m)").unwrap();

        assert_eq!(processed.trim(), "(2, 1)");
    }

    #[test]
    fn master_factor_is_kept_in_range() {
        let config = parse_config("(master_factor: 1.5)").unwrap();

        assert_eq!(config.master_factor, 0.95);
    }

    #[test]
    fn shipped_template_parses() {
        let config = parse_config(TEMPLATE).unwrap();

        assert_eq!(config.terminal, "st");
        assert_eq!(config.scratchpads.len(), 2);
        assert_eq!(config.rules[0].switch_tag, crate::rules::SwitchTag::View);
        assert_eq!(config.keybindings, Config::default().keybindings);
    }
}
