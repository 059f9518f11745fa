use crate::foundation::core::{CYCLE_RATE_DIVISOR, Rgb};
use crate::foundation::error::{DayglowError, DayglowResult};
use crate::import::lbm::{LbmData, LbmLayer};
use crate::world::data::CycleSpec;

#[derive(Debug, serde::Deserialize)]
struct DPaintData {
    #[serde(default)]
    palette: Vec<Rgb>,
    #[serde(rename = "colorRange", default)]
    color_range: Vec<DPaintCycle>,
    #[serde(rename = "indexedPixels")]
    indexed_pixels: Option<Vec<Vec<u32>>>,
    image: DPaintImage,
}

#[derive(Debug, serde::Deserialize)]
struct DPaintImage {
    #[serde(default)]
    name: String,
    width: u32,
    height: u32,
    #[serde(default)]
    frames: Vec<DPaintFrame>,
}

#[derive(Debug, serde::Deserialize)]
struct DPaintFrame {
    #[serde(default)]
    layers: Vec<DPaintLayer>,
}

#[derive(Debug, serde::Deserialize)]
struct DPaintLayer {
    #[serde(default)]
    name: String,
    #[serde(rename = "indexedPixels", default)]
    indexed_pixels: Vec<Vec<u32>>,
}

#[derive(Debug, serde::Deserialize)]
struct DPaintCycle {
    low: usize,
    high: usize,
    fps: f64,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    reverse: bool,
}

/// Convert a paint-tool JSON export into the normalized import shape.
/// Only active color ranges become cycles; their per-second fps is
/// rescaled onto the stored rate unit.
pub fn convert(json: &str) -> DayglowResult<LbmData> {
    let data: DPaintData = serde_json::from_str(json)
        .map_err(|err| DayglowError::validation(format!("parsing DPaintJS file: {err}")))?;

    let Some(indexed_pixels) = data.indexed_pixels else {
        return Err(DayglowError::validation(
            "No pixels found; you must save the file as 'Indexed' format (it's under More).",
        ));
    };

    let cycles: Vec<CycleSpec> = data
        .color_range
        .iter()
        .filter(|range| range.active)
        .map(|range| CycleSpec {
            low: range.low,
            high: range.high,
            rate: range.fps * CYCLE_RATE_DIVISOR,
            reverse: if range.reverse { 2 } else { 0 },
        })
        .collect();

    let mut layers: Vec<LbmLayer> = Vec::new();
    if let Some(frame) = data.image.frames.first() {
        for layer in &frame.layers {
            layers.push(LbmLayer {
                name: layer.name.clone(),
                pixels: layer.indexed_pixels.iter().flatten().copied().collect(),
            });
        }
    }

    if layers.is_empty() {
        layers.push(LbmLayer {
            name: data.image.name.clone(),
            pixels: indexed_pixels.into_iter().flatten().collect(),
        });
    }

    Ok(LbmData {
        name: data.image.name,
        width: data.image.width,
        height: data.image.height,
        colors: data.palette,
        layers,
        cycles,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/import/dpaint.rs"]
mod tests;
