use crate::attach::AttachMode;
use crate::client::ClientKey;
use crate::layout::{GapConfig, LayoutType};
use crate::tags::{ALL_TAGS, REAL_TAG_MASK, TAG_COUNT, TAG_MASK, TagMask, lowest_tag_number};
use serde::Deserialize;

/// Per-tag defaults applied when a monitor is created.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TagRule {
    /// 1-based tag number.
    pub tag: usize,
    pub layout: LayoutType,
    #[serde(default)]
    pub master_factor: Option<f32>,
    #[serde(default)]
    pub gaps: Option<GapConfig>,
}

/// Everything a monitor remembers separately for each tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagSettings {
    pub num_master: usize,
    pub master_factor: f32,
    pub selected_layout: usize,
    pub layouts: [LayoutType; 2],
    pub selected_attach: usize,
    pub attach_modes: [AttachMode; 2],
    pub show_bar: bool,
    pub gaps_enabled: bool,
    pub gaps: GapConfig,
    /// Client bumped out of the master slot by the last zoom on this tag.
    pub previous_zoom: Option<ClientKey>,
}

/// Slot 0 belongs to the "all tags" view, slots 1..=TAG_COUNT to the real tags.
#[derive(Debug, Clone)]
pub struct Pertag {
    pub current_tag: usize,
    pub previous_tag: usize,
    slots: Vec<TagSettings>,
}

impl Pertag {
    pub fn new(defaults: TagSettings, tag_rules: &[TagRule]) -> Self {
        let mut slots = vec![defaults; TAG_COUNT + 1];

        for rule in tag_rules {
            let Some(slot) = slots.get_mut(rule.tag) else {
                continue;
            };
            slot.layouts[0] = rule.layout;
            if let Some(factor) = rule.master_factor.filter(|f| *f > 0.0) {
                slot.master_factor = factor;
            }
            if let Some(gaps) = rule.gaps {
                slot.gaps = gaps;
            }
        }

        Self {
            current_tag: 1,
            previous_tag: 1,
            slots,
        }
    }

    pub fn current(&self) -> &TagSettings {
        &self.slots[self.current_tag]
    }

    pub fn current_mut(&mut self) -> &mut TagSettings {
        &mut self.slots[self.current_tag]
    }

    pub fn slot(&self, tag: usize) -> Option<&TagSettings> {
        self.slots.get(tag)
    }

    /// Move to the slot for a `view` of `mask`. A zero mask returns to the previous slot.
    pub fn select_for_view(&mut self, mask: TagMask) {
        if mask & TAG_MASK == 0 {
            std::mem::swap(&mut self.current_tag, &mut self.previous_tag);
            return;
        }

        self.previous_tag = self.current_tag;
        self.current_tag = if mask == ALL_TAGS {
            0
        } else {
            slot_for(mask)
        };
    }

    /// Move to the slot matching a tagset produced by `toggleview`. The slot only changes
    /// when the current tag is no longer part of the view.
    pub fn select_for_toggle(&mut self, tagset: TagMask) {
        if tagset == TAG_MASK {
            self.previous_tag = self.current_tag;
            self.current_tag = 0;
            return;
        }

        let current_still_shown =
            self.current_tag > 0 && tagset & (1 << (self.current_tag - 1)) != 0;
        if !current_still_shown {
            self.previous_tag = self.current_tag;
            self.current_tag = slot_for(tagset);
        }
    }

    /// Drop references to a client that is going away.
    pub fn forget(&mut self, key: ClientKey) {
        for slot in &mut self.slots {
            if slot.previous_zoom == Some(key) {
                slot.previous_zoom = None;
            }
        }
    }
}

/// Scratchpad-only views have no slot of their own and share the "all tags" one.
fn slot_for(mask: TagMask) -> usize {
    lowest_tag_number(mask & REAL_TAG_MASK).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::scratchpad_tag;

    fn defaults() -> TagSettings {
        TagSettings {
            num_master: 1,
            master_factor: 0.55,
            selected_layout: 0,
            layouts: [LayoutType::Tile, LayoutType::Monocle],
            selected_attach: 0,
            attach_modes: [AttachMode::Aside, AttachMode::Aside],
            show_bar: true,
            gaps_enabled: true,
            gaps: GapConfig::uniform(5),
            previous_zoom: None,
        }
    }

    #[test]
    fn tag_rules_override_their_slot() {
        let rules = [TagRule {
            tag: 4,
            layout: LayoutType::Deck,
            master_factor: Some(0.5),
            gaps: Some(GapConfig::default()),
        }];
        let pertag = Pertag::new(defaults(), &rules);

        let slot = pertag.slot(4).unwrap();
        assert_eq!(slot.layouts[0], LayoutType::Deck);
        assert_eq!(slot.master_factor, 0.5);
        assert_eq!(slot.gaps, GapConfig::default());
        assert_eq!(pertag.slot(3), Some(&defaults()));
    }

    #[test]
    fn out_of_range_tag_rules_are_ignored() {
        let rules = [TagRule {
            tag: TAG_COUNT + 1,
            layout: LayoutType::Deck,
            master_factor: None,
            gaps: None,
        }];
        let pertag = Pertag::new(defaults(), &rules);

        assert!((0..=TAG_COUNT).all(|t| pertag.slot(t) == Some(&defaults())));
    }

    #[test]
    fn view_selects_the_lowest_tag() {
        let mut pertag = Pertag::new(defaults(), &[]);
        pertag.select_for_view(0b0110);

        assert_eq!(pertag.current_tag, 2);
        assert_eq!(pertag.previous_tag, 1);
    }

    #[test]
    fn empty_view_swaps_back() {
        let mut pertag = Pertag::new(defaults(), &[]);
        pertag.select_for_view(0b0100);
        pertag.select_for_view(0);

        assert_eq!(pertag.current_tag, 1);
        assert_eq!(pertag.previous_tag, 3);
    }

    #[test]
    fn viewing_everything_uses_slot_zero() {
        let mut pertag = Pertag::new(defaults(), &[]);
        pertag.select_for_view(ALL_TAGS);

        assert_eq!(pertag.current_tag, 0);
    }

    #[test]
    fn toggle_keeps_the_current_slot_while_it_is_shown() {
        let mut pertag = Pertag::new(defaults(), &[]);
        pertag.select_for_toggle(0b0101);
        assert_eq!(pertag.current_tag, 1);

        pertag.select_for_toggle(0b0100);
        assert_eq!(pertag.current_tag, 3);
        assert_eq!(pertag.previous_tag, 1);
    }

    #[test]
    fn toggle_out_of_the_all_tags_view() {
        let mut pertag = Pertag::new(defaults(), &[]);
        pertag.select_for_view(ALL_TAGS);
        pertag.select_for_toggle(TAG_MASK & !0b1);

        assert_eq!(pertag.current_tag, 2);
    }

    #[test]
    fn scratchpad_only_views_share_slot_zero() {
        let mut pertag = Pertag::new(defaults(), &[]);
        pertag.select_for_toggle(scratchpad_tag(1));

        assert_eq!(pertag.current_tag, 0);
    }

    #[test]
    fn forgetting_a_client_clears_its_zoom_references() {
        let mut arena = crate::client::ClientArena::with_key();
        let key = arena.insert(crate::client::Client::new(1, 0, 1));
        let mut pertag = Pertag::new(defaults(), &[]);
        pertag.current_mut().previous_zoom = Some(key);

        pertag.forget(key);

        assert_eq!(pertag.current().previous_zoom, None);
    }
}
