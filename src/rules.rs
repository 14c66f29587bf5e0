use crate::tags::{SCRATCHPAD_MASK, TagMask};
use serde::Deserialize;

/// What to do with the view when a rule tags a client somewhere off screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchTag {
    #[default]
    Stay,
    /// View the client's tags.
    View,
    /// Add the client's tags to the view.
    Merge,
    /// Like `View`, returning to the old view once the client is gone.
    ViewReturn,
    /// Like `Merge`, returning to the old view once the client is gone.
    MergeReturn,
}

impl SwitchTag {
    pub fn merges(&self) -> bool {
        matches!(self, Self::Merge | Self::MergeReturn)
    }

    pub fn returns(&self) -> bool {
        matches!(self, Self::ViewReturn | Self::MergeReturn)
    }

    pub fn views(&self) -> bool {
        matches!(self, Self::View | Self::ViewReturn)
    }
}

/// Matches a new client by substrings of its class, instance and title. A missing
/// pattern matches anything.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: TagMask,
    #[serde(default)]
    pub switch_tag: SwitchTag,
    #[serde(default)]
    pub is_floating: bool,
    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub no_swallow: bool,
    /// Monitor number, negative for "wherever the client appears".
    #[serde(default = "any_monitor")]
    pub monitor: i32,
}

fn any_monitor() -> i32 {
    -1
}

impl Rule {
    pub fn class(class: &str) -> Self {
        Self {
            class: Some(class.to_string()),
            ..Self::default()
        }
    }

    pub fn instance(instance: &str) -> Self {
        Self {
            instance: Some(instance.to_string()),
            ..Self::default()
        }
    }

    pub fn title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn tags(mut self, tags: TagMask) -> Self {
        self.tags = tags;
        self
    }

    pub fn switch_tag(mut self, switch_tag: SwitchTag) -> Self {
        self.switch_tag = switch_tag;
        self
    }

    pub fn floating(mut self) -> Self {
        self.is_floating = true;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    pub fn no_swallow(mut self) -> Self {
        self.no_swallow = true;
        self
    }

    pub fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let contains = |pattern: &Option<String>, value: &str| {
            pattern.as_deref().is_none_or(|p| value.contains(p))
        };
        contains(&self.title, title) && contains(&self.class, class) && contains(&self.instance, instance)
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            class: None,
            instance: None,
            title: None,
            tags: 0,
            switch_tag: SwitchTag::Stay,
            is_floating: false,
            is_terminal: false,
            no_swallow: false,
            monitor: any_monitor(),
        }
    }
}

/// A view change requested by one matching rule, with the tags the client had
/// accumulated when that rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchRequest {
    pub mode: SwitchTag,
    pub tags: TagMask,
    pub monitor: Option<usize>,
}

/// The combined effect of every rule that matched one client.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Union of all matching rules' tags, unmasked.
    pub tags: TagMask,
    pub is_floating: bool,
    pub is_terminal: bool,
    pub no_swallow: bool,
    pub monitor: Option<usize>,
    /// A floating rule sent the client to a scratchpad, so it starts centred.
    pub center: bool,
    pub switches: Vec<SwitchRequest>,
}

/// Run the rule table over a client. Tags accumulate across matches while the flags and
/// the monitor come from the last rule that matched. Missing class or instance hints
/// are matched as the string "broken".
pub fn apply_rules(
    rules: &[Rule],
    class: Option<&str>,
    instance: Option<&str>,
    title: &str,
    monitor_count: usize,
) -> RuleOutcome {
    let class = class.unwrap_or("broken");
    let instance = instance.unwrap_or("broken");
    let mut outcome = RuleOutcome::default();

    for rule in rules.iter().filter(|r| r.matches(class, instance, title)) {
        outcome.is_terminal = rule.is_terminal;
        outcome.no_swallow = rule.no_swallow;
        outcome.is_floating = rule.is_floating;
        outcome.tags |= rule.tags;

        if rule.tags & SCRATCHPAD_MASK != 0 && rule.is_floating {
            outcome.center = true;
        }
        if let Ok(index) = usize::try_from(rule.monitor) {
            if index < monitor_count {
                outcome.monitor = Some(index);
            }
        }
        if rule.switch_tag != SwitchTag::Stay {
            outcome.switches.push(SwitchRequest {
                mode: rule.switch_tag,
                tags: outcome.tags,
                monitor: outcome.monitor,
            });
        }
    }

    outcome
}

/// The tagset a switch request should move the view to, given the current one.
/// `None` when the view should stay: the client is already on screen, or the new view
/// would be empty.
pub fn switch_target(request: &SwitchRequest, current: TagMask) -> Option<TagMask> {
    let target = if request.mode.merges() {
        current ^ request.tags
    } else {
        request.tags
    };

    (target != 0 && request.tags & current == 0).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{scratchpad_tag, tag_bit};
    use simple_test_case::test_case;

    #[test]
    fn last_match_wins_for_flags() {
        let rules = vec![Rule::class("Gimp"), Rule::class("Gimp").floating()];
        let outcome = apply_rules(&rules, Some("Gimp"), Some("gimp"), "GNU Image", 1);

        assert!(outcome.is_floating);

        let reversed: Vec<Rule> = rules.into_iter().rev().collect();
        let outcome = apply_rules(&reversed, Some("Gimp"), Some("gimp"), "GNU Image", 1);

        assert!(!outcome.is_floating);
    }

    #[test]
    fn tags_accumulate_across_matches() {
        let rules = vec![
            Rule::class("Firefox").tags(tag_bit(1)),
            Rule::title("Mozilla").tags(tag_bit(3)),
            Rule::class("Thunar").tags(tag_bit(5)),
        ];
        let outcome = apply_rules(&rules, Some("Firefox"), None, "Mozilla Firefox", 1);

        assert_eq!(outcome.tags, tag_bit(1) | tag_bit(3));
    }

    #[test_case(Some("st-256color"), None, "", true; "class substring")]
    #[test_case(None, Some("st-256color"), "", false; "instance is not class")]
    #[test_case(None, None, "", false; "missing hints are broken")]
    #[test]
    fn class_matching(class: Option<&str>, instance: Option<&str>, title: &str, expected: bool) {
        let rules = vec![Rule::class("st-").terminal()];
        let outcome = apply_rules(&rules, class, instance, title, 1);

        assert_eq!(outcome.is_terminal, expected);
    }

    #[test]
    fn missing_hints_match_broken_patterns() {
        let rules = vec![Rule::instance("broken").floating()];
        let outcome = apply_rules(&rules, None, None, "", 1);

        assert!(outcome.is_floating);
    }

    #[test]
    fn floating_scratchpad_rules_centre_the_client() {
        let rules = vec![Rule::instance("spterm").tags(scratchpad_tag(0)).floating()];
        let outcome = apply_rules(&rules, Some("st"), Some("spterm"), "", 1);

        assert!(outcome.center);
        assert_eq!(outcome.tags, scratchpad_tag(0));
    }

    #[test]
    fn unknown_monitors_are_ignored() {
        let mut rule = Rule::class("mpv");
        rule.monitor = 3;
        let outcome = apply_rules(&[rule], Some("mpv"), None, "", 2);

        assert_eq!(outcome.monitor, None);
    }

    #[test]
    fn switch_requests_carry_the_tags_seen_so_far() {
        let rules = vec![
            Rule::class("Thunar").tags(tag_bit(2)).switch_tag(SwitchTag::View),
            Rule::class("Thunar").tags(tag_bit(3)).switch_tag(SwitchTag::Merge),
        ];
        let outcome = apply_rules(&rules, Some("Thunar"), None, "", 1);

        assert_eq!(outcome.switches.len(), 2);
        assert_eq!(outcome.switches[0].tags, tag_bit(2));
        assert_eq!(outcome.switches[1].tags, tag_bit(2) | tag_bit(3));
    }

    #[test_case(SwitchTag::View, tag_bit(0), Some(tag_bit(2)); "view")]
    #[test_case(SwitchTag::Merge, tag_bit(0), Some(tag_bit(0) | tag_bit(2)); "merge")]
    #[test_case(SwitchTag::View, tag_bit(2), None; "already shown")]
    #[test]
    fn switch_targets(mode: SwitchTag, current: TagMask, expected: Option<TagMask>) {
        let request = SwitchRequest {
            mode,
            tags: tag_bit(2),
            monitor: None,
        };

        assert_eq!(switch_target(&request, current), expected);
    }
}
