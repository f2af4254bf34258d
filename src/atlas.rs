//! Atlas addressing: pure geometry for animation frames.
//!
//! A sprite's frames are laid out in a grid inside the atlas, starting at
//! `location`, each `size` pixels, separated by `frame_gap`. Frames are
//! numbered row-major across `frame_grid[0]` columns.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};
use crate::types::{AtlasRegion, Point};

/// One sprite entry of a spritesheet manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameLayout {
    #[serde(default)]
    pub animated: bool,
    pub location: [u32; 2],
    pub size: [u32; 2],
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
    #[serde(default = "default_frame_grid")]
    pub frame_grid: [u32; 2],
    #[serde(default)]
    pub frame_gap: [u32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

fn default_frame_count() -> u32 {
    1
}

fn default_frame_grid() -> [u32; 2] {
    [1, 1]
}

/// Top-left corner of frame `frame_index` of `layout`.
pub fn locate(layout: &FrameLayout, frame_index: u32) -> Result<Point> {
    let cols = layout.frame_grid[0];
    if cols == 0 {
        return Err(RuntimeError::config("frameGrid must have at least one column"));
    }

    let axis = |i: usize, cell: u32| {
        layout.size[i]
            .checked_add(layout.frame_gap[i])
            .and_then(|stride| stride.checked_mul(cell))
            .and_then(|offset| offset.checked_add(layout.location[i]))
            .ok_or_else(|| RuntimeError::config(format!("frame {frame_index} lies outside the addressable atlas")))
    };
    Ok(Point {
        x: axis(0, frame_index % cols)?,
        y: axis(1, frame_index / cols)?,
    })
}

/// Every frame rectangle of `layout`, in playback order.
///
/// A static layout yields exactly one region. The result is never empty.
pub fn frames(layout: &FrameLayout) -> Result<Vec<AtlasRegion>> {
    let [width, height] = layout.size;

    if !layout.animated {
        let [x, y] = layout.location;
        return Ok(vec![AtlasRegion::new(x, y, width, height)]);
    }

    if layout.frame_count == 0 {
        return Err(RuntimeError::config("animated sprites need at least one frame"));
    }

    (0..layout.frame_count)
        .map(|frame| locate(layout, frame).map(|p| AtlasRegion::new(p.x, p.y, width, height)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_cycle() -> FrameLayout {
        FrameLayout {
            animated: true,
            location: [8, 4],
            size: [16, 32],
            frame_count: 5,
            frame_grid: [3, 2],
            frame_gap: [2, 1],
            speed: None,
        }
    }

    #[test]
    fn locate_wraps_onto_next_row() {
        let layout = walk_cycle();
        assert_eq!(locate(&layout, 0).unwrap(), Point { x: 8, y: 4 });
        assert_eq!(locate(&layout, 2).unwrap(), Point { x: 8 + 18 * 2, y: 4 });
        assert_eq!(locate(&layout, 3).unwrap(), Point { x: 8, y: 4 + 33 });
        assert_eq!(locate(&layout, 4).unwrap(), Point { x: 26, y: 37 });
    }

    #[test]
    fn animated_layout_yields_frame_count_regions() {
        let regions = frames(&walk_cycle()).unwrap();
        assert_eq!(regions.len(), 5);
        assert!(regions.iter().all(|r| r.width == 16 && r.height == 32));
        assert_eq!(regions[4], AtlasRegion::new(26, 37, 16, 32));
    }

    #[test]
    fn static_layout_ignores_frame_settings() {
        let layout = FrameLayout {
            animated: false,
            frame_count: 9,
            ..walk_cycle()
        };
        assert_eq!(frames(&layout).unwrap(), vec![AtlasRegion::new(8, 4, 16, 32)]);
    }

    #[test]
    fn zero_columns_is_a_configuration_error() {
        let layout = FrameLayout {
            frame_grid: [0, 1],
            ..walk_cycle()
        };
        assert!(matches!(frames(&layout), Err(RuntimeError::Configuration(_))));
    }

    #[test]
    fn frames_past_the_addressable_atlas_are_rejected() {
        let layout = FrameLayout {
            size: [70_000, 70_000],
            frame_count: 70_000,
            frame_grid: [70_000, 1],
            ..walk_cycle()
        };
        assert!(matches!(frames(&layout), Err(RuntimeError::Configuration(_))));
        assert!(locate(&layout, 0).is_ok());
    }

    #[test]
    fn animated_without_frames_is_rejected() {
        let layout = FrameLayout {
            frame_count: 0,
            ..walk_cycle()
        };
        assert!(matches!(frames(&layout), Err(RuntimeError::Configuration(_))));
    }

    #[test]
    fn manifest_defaults_apply() {
        let layout: FrameLayout =
            serde_json::from_str(r#"{"location":[1,2],"size":[3,4]}"#).unwrap();
        assert!(!layout.animated);
        assert_eq!(layout.frame_count, 1);
        assert_eq!(layout.frame_grid, [1, 1]);
        assert_eq!(layout.speed, None);
    }
}
