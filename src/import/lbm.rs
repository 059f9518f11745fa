use serde_json::Value;

use crate::foundation::core::Rgb;
use crate::foundation::error::{DayglowError, DayglowResult};
use crate::import::dpaint;
use crate::world::data::CycleSpec;
use crate::world::store::WORLD_DATA_TYPE;

/// One named pixel-index layer of an imported image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LbmLayer {
    /// Layer name.
    pub name: String,
    /// Row-major palette indices.
    pub pixels: Vec<u32>,
}

/// The common shape every consumed import format is normalized into:
/// dimensions, a color table, one or more pixel-index layers, and
/// color-cycle descriptors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LbmData {
    /// Source name (usually the imported file name).
    pub name: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Color table.
    pub colors: Vec<Rgb>,
    /// Pixel layers; the first is the base image, the rest overlays.
    pub layers: Vec<LbmLayer>,
    /// Color-cycle descriptors.
    pub cycles: Vec<CycleSpec>,
}

// The out-of-band converter's output for a binary indexed bitmap.
#[derive(Debug, serde::Deserialize)]
struct ConvertedBitmap {
    width: u32,
    height: u32,
    colors: Vec<Rgb>,
    pixels: Vec<u32>,
    #[serde(default)]
    cycles: Vec<CycleSpec>,
}

/// Normalize a pixel JSON payload into [`LbmData`]. Accepts the paint
/// tool's export (`"type": "dpaint"`) or the converter's plain
/// width/height/colors/pixels shape; a world envelope is called out as
/// the wrong kind of file.
pub fn parse_pixel_json(name: &str, json: &str) -> DayglowResult<LbmData> {
    let value: Value = serde_json::from_str(json)
        .map_err(|err| DayglowError::validation(format!("parsing pixel JSON: {err}")))?;

    if value["type"].as_str() == Some("dpaint") {
        return dpaint::convert(json);
    }

    if value["format"]["type"].as_str() == Some(WORLD_DATA_TYPE) {
        return Err(DayglowError::validation(
            "This is a world file, not pixels.",
        ));
    }

    if value.get("pixels").is_some() {
        let converted: ConvertedBitmap = serde_json::from_value(value)
            .map_err(|err| DayglowError::validation(format!("parsing converted bitmap: {err}")))?;
        return Ok(LbmData {
            name: name.to_string(),
            width: converted.width,
            height: converted.height,
            colors: converted.colors,
            layers: vec![LbmLayer {
                name: name.to_string(),
                pixels: converted.pixels,
            }],
            cycles: converted.cycles,
        });
    }

    Err(DayglowError::validation("This is not a DPaintJS file."))
}

#[cfg(test)]
#[path = "../../tests/unit/import/lbm.rs"]
mod tests;
