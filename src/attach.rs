use crate::client::{ClientArena, ClientKey};
use crate::monitor::Monitor;
use serde::Deserialize;

/// Where a new client lands in its monitor's client list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachMode {
    /// Prepend, becoming the first master.
    Top,
    Below,
    Above,
    Bottom,
    /// Just after the master area.
    #[default]
    Aside,
}

impl AttachMode {
    pub const ALL: [AttachMode; 5] = [
        Self::Top,
        Self::Below,
        Self::Above,
        Self::Bottom,
        Self::Aside,
    ];

    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|mode| mode == self)
            .unwrap_or_default()
    }

    pub fn cycle(&self, direction: i32) -> Self {
        let count = Self::ALL.len() as i32;
        let next = (self.index() as i32 + direction).rem_euclid(count);
        Self::ALL[next as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Below => "below",
            Self::Above => "above",
            Self::Bottom => "bottom",
            Self::Aside => "aside",
        }
    }
}

impl std::str::FromStr for AttachMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == lowered)
            .ok_or_else(|| format!("Invalid Attach Mode: {}", s))
    }
}

/// Insert `key` into `monitor.clients` according to `mode`. The client must not already be
/// in the list.
pub fn attach(mode: AttachMode, monitor: &mut Monitor, clients: &ClientArena, key: ClientKey) {
    debug_assert!(!monitor.clients.contains(&key));

    match mode {
        AttachMode::Top => monitor.clients.insert(0, key),
        AttachMode::Bottom => monitor.clients.push(key),
        AttachMode::Above => attach_above(monitor, clients, key),
        AttachMode::Below => attach_below(monitor, clients, key),
        AttachMode::Aside => attach_aside(monitor, clients, key),
    }
}

fn selected_position(monitor: &Monitor, clients: &ClientArena) -> Option<usize> {
    let selected = monitor.selected?;
    if clients.get(selected).is_none_or(|client| client.is_floating) {
        return None;
    }
    monitor.clients.iter().position(|&k| k == selected)
}

fn attach_above(monitor: &mut Monitor, clients: &ClientArena, key: ClientKey) {
    match selected_position(monitor, clients) {
        Some(position) if position > 0 => monitor.clients.insert(position, key),
        _ => monitor.clients.insert(0, key),
    }
}

fn attach_below(monitor: &mut Monitor, clients: &ClientArena, key: ClientKey) {
    match selected_position(monitor, clients) {
        Some(position) => monitor.clients.insert(position + 1, key),
        None => monitor.clients.push(key),
    }
}

/// The new client goes right after the last master that is on screen. Hidden clients are
/// never used as that anchor, but the slots they hold count towards `num_master` when
/// there are too few shown masters to fill it.
fn attach_aside(monitor: &mut Monitor, clients: &ClientArena, key: ClientKey) {
    if monitor.num_master == 0 {
        monitor.clients.insert(0, key);
        return;
    }

    let tagset = monitor.current_tagset();
    let is_tiled_visible = |k: &ClientKey| {
        clients
            .get(*k)
            .is_some_and(|c| !c.is_floating && c.is_visible_on(tagset))
    };

    let mut pending_hidden = 0;
    let mut shown_masters = 0;
    let mut slots_taken = 0;
    let mut anchor = None;

    for (position, k) in monitor.clients.iter().enumerate() {
        if shown_masters >= monitor.num_master {
            break;
        }
        if !is_tiled_visible(k) {
            continue;
        }
        if clients[*k].is_hidden {
            pending_hidden += 1;
        } else {
            shown_masters += 1;
            slots_taken += pending_hidden + 1;
            pending_hidden = 0;
            anchor = Some(position);
        }
    }

    if slots_taken < monitor.num_master {
        let start = anchor.map_or(0, |position| position + 1);
        for position in start..monitor.clients.len() {
            if slots_taken >= monitor.num_master {
                break;
            }
            if is_tiled_visible(&monitor.clients[position]) {
                anchor = Some(position);
                slots_taken += 1;
            }
        }
    }

    match anchor {
        Some(position) => monitor.clients.insert(position + 1, key),
        None => monitor.clients.push(key),
    }
}
