use anyhow::{Context, Result};
use image::RgbaImage;
use snapscribe_core::ScreenCapture;
use snapscribe_types::{CaptureRegion, ScreenBounds};
use xcap::Monitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

impl MonitorInfo {
    fn from_monitor(monitor: &Monitor) -> Self {
        Self {
            name: monitor.name().to_string(),
            x: monitor.x(),
            y: monitor.y(),
            width: monitor.width(),
            height: monitor.height(),
            primary: monitor.is_primary(),
        }
    }

    fn contains_point(&self, x: i32, y: i32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        x >= i64::from(self.x)
            && y >= i64::from(self.y)
            && x < i64::from(self.x) + i64::from(self.width)
            && y < i64::from(self.y) + i64::from(self.height)
    }

    fn contains_region(&self, region: &CaptureRegion) -> bool {
        self.contains_point(region.x, region.y)
            && region.right() <= i64::from(self.x) + i64::from(self.width)
            && region.bottom() <= i64::from(self.y) + i64::from(self.height)
    }
}

/// List all monitors with their geometry
pub fn list_monitors() -> Result<Vec<MonitorInfo>> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    Ok(monitors.iter().map(MonitorInfo::from_monitor).collect())
}

/// Crop rectangle on a monitor image: (monitor index, x, y, width, height)
type CropPlan = (usize, u32, u32, u32, u32);

/// Pick the monitor holding the region and clip the region to it.
///
/// A monitor containing the whole region wins, otherwise the one under the
/// region's top-left corner. The region is clipped at that monitor's edges.
fn plan_crop(monitors: &[MonitorInfo], region: &CaptureRegion) -> Option<CropPlan> {
    let index = monitors
        .iter()
        .position(|m| m.contains_region(region))
        .or_else(|| {
            monitors
                .iter()
                .position(|m| m.contains_point(region.x, region.y))
        })?;
    let monitor = &monitors[index];

    let offset_x = (i64::from(region.x) - i64::from(monitor.x)) as u32;
    let offset_y = (i64::from(region.y) - i64::from(monitor.y)) as u32;
    let width = (region.width.max(0) as u32).min(monitor.width - offset_x);
    let height = (region.height.max(0) as u32).min(monitor.height - offset_y);

    Some((index, offset_x, offset_y, width, height))
}

fn union_bounds(monitors: &[MonitorInfo]) -> Option<ScreenBounds> {
    let min_x = monitors.iter().map(|m| i64::from(m.x)).min()?;
    let min_y = monitors.iter().map(|m| i64::from(m.y)).min()?;
    let max_x = monitors
        .iter()
        .map(|m| i64::from(m.x) + i64::from(m.width))
        .max()?;
    let max_y = monitors
        .iter()
        .map(|m| i64::from(m.y) + i64::from(m.height))
        .max()?;

    Some(ScreenBounds {
        x: min_x as i32,
        y: min_y as i32,
        width: (max_x - min_x) as u32,
        height: (max_y - min_y) as u32,
    })
}

/// Screen capture through xcap, cropping a single monitor's image
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapScreenCapture;

impl XcapScreenCapture {
    pub fn new() -> Self {
        Self
    }
}

impl ScreenCapture for XcapScreenCapture {
    fn capture(&self, region: CaptureRegion) -> Result<RgbaImage> {
        let monitors = Monitor::all().context("Failed to get monitors")?;
        let infos: Vec<MonitorInfo> = monitors.iter().map(MonitorInfo::from_monitor).collect();

        let (index, x, y, width, height) = plan_crop(&infos, &region)
            .with_context(|| format!("Region {region} is not on any monitor"))?;
        tracing::debug!(
            "Capturing {}x{} at ({}, {}) on monitor '{}'",
            width,
            height,
            x,
            y,
            infos[index].name
        );

        let captured = monitors[index]
            .capture_image()
            .context("Failed to capture screen")?;
        // Re-wrap so we do not depend on xcap's image version
        let (full_width, full_height) = (captured.width(), captured.height());
        let full = RgbaImage::from_raw(full_width, full_height, captured.into_raw())
            .context("Captured buffer does not match its dimensions")?;

        // The monitor image can be smaller than reported geometry (scaling)
        let width = width.min(full_width.saturating_sub(x));
        let height = height.min(full_height.saturating_sub(y));

        Ok(image::imageops::crop_imm(&full, x, y, width, height).to_image())
    }

    fn screen_bounds(&self) -> Option<ScreenBounds> {
        match list_monitors() {
            Ok(monitors) => union_bounds(&monitors),
            Err(e) => {
                tracing::debug!("Could not detect screen bounds: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(x: i32, y: i32, width: u32, height: u32) -> MonitorInfo {
        MonitorInfo {
            name: format!("{x},{y}"),
            x,
            y,
            width,
            height,
            primary: x == 0 && y == 0,
        }
    }

    fn dual() -> Vec<MonitorInfo> {
        vec![monitor(0, 0, 1920, 1080), monitor(1920, 0, 1280, 1024)]
    }

    #[test]
    fn test_plan_crop_inside_primary() {
        let plan = plan_crop(&dual(), &CaptureRegion::new(100, 100, 200, 50));
        assert_eq!(plan, Some((0, 100, 100, 200, 50)));
    }

    #[test]
    fn test_plan_crop_on_second_monitor_is_relative() {
        let plan = plan_crop(&dual(), &CaptureRegion::new(2000, 10, 100, 100));
        assert_eq!(plan, Some((1, 80, 10, 100, 100)));
    }

    #[test]
    fn test_plan_crop_clips_at_monitor_edge() {
        let plan = plan_crop(&dual(), &CaptureRegion::new(1800, 1000, 400, 400));
        assert_eq!(plan, Some((0, 1800, 1000, 120, 80)));
    }

    #[test]
    fn test_plan_crop_off_screen() {
        assert_eq!(plan_crop(&dual(), &CaptureRegion::new(5000, 5000, 10, 10)), None);
        assert_eq!(plan_crop(&[], &CaptureRegion::new(0, 0, 10, 10)), None);
    }

    #[test]
    fn test_union_bounds() {
        let bounds = union_bounds(&[monitor(-1280, 0, 1280, 1024), monitor(0, 0, 1920, 1080)]);
        assert_eq!(
            bounds,
            Some(ScreenBounds {
                x: -1280,
                y: 0,
                width: 3200,
                height: 1080,
            })
        );
        assert_eq!(union_bounds(&[]), None);
    }
}
