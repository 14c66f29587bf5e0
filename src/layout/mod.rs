pub mod bstack;
pub mod centered;
pub mod deck;
pub mod fibonacci;
pub mod floating;
pub mod grid;
pub mod monocle;
pub mod tiling;

use crate::geometry::Rect;
use serde::Deserialize;

/// Gap sizes in pixels. "Horizontal" gaps are the horizontal strips between windows and
/// so space things out vertically: outer horizontal pads the top and bottom of the work
/// area, inner horizontal separates windows stacked above one another.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GapConfig {
    pub inner_horizontal: i32,
    pub inner_vertical: i32,
    pub outer_horizontal: i32,
    pub outer_vertical: i32,
}

impl GapConfig {
    pub const fn uniform(size: i32) -> Self {
        Self {
            inner_horizontal: size,
            inner_vertical: size,
            outer_horizontal: size,
            outer_vertical: size,
        }
    }

    /// Gaps as a layout should use them: all zero when disabled for the tag, outer
    /// gaps dropped for a lone client under smartgaps.
    pub fn effective(&self, enabled: bool, smart_gaps: bool, tiled_count: usize) -> Self {
        if !enabled {
            return Self::default();
        }

        let outer_enabled = !(smart_gaps && tiled_count == 1);
        Self {
            inner_horizontal: self.inner_horizontal,
            inner_vertical: self.inner_vertical,
            outer_horizontal: if outer_enabled { self.outer_horizontal } else { 0 },
            outer_vertical: if outer_enabled { self.outer_vertical } else { 0 },
        }
    }

    pub fn adjusted(&self, delta: GapConfig) -> Self {
        Self {
            inner_horizontal: (self.inner_horizontal + delta.inner_horizontal).max(0),
            inner_vertical: (self.inner_vertical + delta.inner_vertical).max(0),
            outer_horizontal: (self.outer_horizontal + delta.outer_horizontal).max(0),
            outer_vertical: (self.outer_vertical + delta.outer_vertical).max(0),
        }
    }
}

/// Inputs shared by every arrangement algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    pub area: Rect,
    pub num_master: usize,
    pub master_factor: f32,
    pub gaps: GapConfig,
    pub bar_height: i32,
    pub border_width: i32,
    /// nrowgrid splits two clients side by side instead of stacking them.
    pub force_vsplit: bool,
}

pub trait Layout {
    /// Outer rects (border included) for the ordered tiled clients, one per entry in
    /// `factors`, which holds each client's cfact.
    fn arrange(&self, context: &LayoutContext, factors: &[f32]) -> Vec<Rect>;
    fn name(&self) -> &'static str;
    fn symbol(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    Tile,
    Monocle,
    Spiral,
    Dwindle,
    Deck,
    #[serde(rename = "bstack")]
    BottomStack,
    #[serde(rename = "bstackhoriz")]
    BottomStackHorizontal,
    Grid,
    #[serde(rename = "nrowgrid")]
    NRowGrid,
    #[serde(rename = "horizgrid")]
    HorizontalGrid,
    #[serde(rename = "gaplessgrid")]
    GaplessGrid,
    #[serde(rename = "centeredmaster")]
    CenteredMaster,
    #[serde(rename = "centeredfloatingmaster")]
    CenteredFloatingMaster,
    Float,
}

impl LayoutType {
    pub const ALL: [LayoutType; 14] = [
        Self::Tile,
        Self::Monocle,
        Self::Spiral,
        Self::Dwindle,
        Self::Deck,
        Self::BottomStack,
        Self::BottomStackHorizontal,
        Self::Grid,
        Self::NRowGrid,
        Self::HorizontalGrid,
        Self::GaplessGrid,
        Self::CenteredMaster,
        Self::CenteredFloatingMaster,
        Self::Float,
    ];

    pub fn layout(&self) -> &'static dyn Layout {
        match self {
            Self::Tile => &tiling::TileLayout,
            Self::Monocle => &monocle::MonocleLayout,
            Self::Spiral => &fibonacci::SpiralLayout,
            Self::Dwindle => &fibonacci::DwindleLayout,
            Self::Deck => &deck::DeckLayout,
            Self::BottomStack => &bstack::BottomStackLayout,
            Self::BottomStackHorizontal => &bstack::BottomStackHorizontalLayout,
            Self::Grid => &grid::GridLayout,
            Self::NRowGrid => &grid::NRowGridLayout,
            Self::HorizontalGrid => &grid::HorizontalGridLayout,
            Self::GaplessGrid => &grid::GaplessGridLayout,
            Self::CenteredMaster => &centered::CenteredMasterLayout,
            Self::CenteredFloatingMaster => &centered::CenteredFloatingMasterLayout,
            Self::Float => &floating::FloatingLayout,
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|layout| layout == self)
            .unwrap_or_default()
    }

    /// Step through the layout list, wrapping at both ends.
    pub fn cycle(&self, direction: i32) -> Self {
        let count = Self::ALL.len() as i32;
        let next = (self.index() as i32 + direction.signum()).rem_euclid(count);
        Self::ALL[next as usize]
    }

    /// Floating mode has no arrange step: clients keep whatever geometry they have.
    pub fn arranges(&self) -> bool {
        !matches!(self, Self::Float)
    }

    pub fn as_str(&self) -> &'static str {
        self.layout().name()
    }

    /// The bar symbol, which deck rewrites to show how many clients share its stack.
    pub fn symbol_for(&self, tiled_count: usize, num_master: usize) -> String {
        match self {
            Self::Deck if tiled_count > num_master => format!("D {}", tiled_count - num_master),
            _ => self.layout().symbol().to_string(),
        }
    }
}

impl std::str::FromStr for LayoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|layout| layout.as_str() == lowered)
            .or(match lowered.as_str() {
                "tiling" => Some(Self::Tile),
                "floating" | "normie" => Some(Self::Float),
                _ => None,
            })
            .ok_or_else(|| format!("Invalid Layout Type: {}", s))
    }
}

/// Sum of the factors of a region and the pixels left over after each member takes
/// its truncated share. The first `rest` members get one extra pixel.
pub(crate) fn region_facts(factors: &[f32], size: i32) -> (f32, i32) {
    let total: f32 = factors.iter().sum();
    let used: i32 = factors
        .iter()
        .map(|factor| portion(size, *factor, total))
        .sum();

    (total, size - used)
}

pub(crate) fn portion(size: i32, factor: f32, total: f32) -> i32 {
    if total <= 0.0 {
        return 0;
    }
    (size as f32 * (factor / total)) as i32
}

pub(crate) fn extra_pixel(index: usize, rest: i32) -> i32 {
    if (index as i32) < rest { 1 } else { 0 }
}

/// Split cfacts into the master and stack regions.
pub(crate) fn split_factors(factors: &[f32], num_master: usize) -> (&[f32], &[f32]) {
    factors.split_at(num_master.min(factors.len()))
}
