use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::foundation::error::{DayglowError, DayglowResult};
use crate::world::data::{WorldData, next_id};

/// Container identity constant; a mismatched `format.type` is rejected.
pub const WORLD_DATA_TYPE: &str = "dayglow-world";
/// Current schema version written by [`serialize_world`].
pub const WORLD_DATA_VERSION: u32 = 2;

/// Serialize a world into the `{format, data}` persistence envelope.
pub fn serialize_world(data: &WorldData) -> DayglowResult<String> {
    let container = serde_json::json!({
        "format": {
            "version": WORLD_DATA_VERSION,
            "type": WORLD_DATA_TYPE,
        },
        "data": data,
    });

    serde_json::to_string(&container)
        .map_err(|err| DayglowError::storage(format!("serializing world: {err}")))
}

/// Tolerant parse used for the local store: accepts the envelope or a
/// bare pre-envelope payload (treated as version 0). Returns the data
/// payload and its schema version.
pub fn parse_stored(json: &str) -> DayglowResult<(Value, u32)> {
    let parsed: Value = serde_json::from_str(json)
        .map_err(|err| DayglowError::storage(format!("parsing stored world: {err}")))?;
    if !parsed.is_object() {
        return Err(DayglowError::storage("stored world is not an object"));
    }

    if parsed.get("format").is_some() {
        let version = parsed["format"]["version"].as_u64().unwrap_or(0) as u32;
        let data = parsed
            .get("data")
            .cloned()
            .ok_or_else(|| DayglowError::storage("stored world has no data payload"))?;
        return Ok((data, version));
    }

    Ok((parsed, 0))
}

/// Strict parse used for user-driven import: the envelope type must match
/// and the data payload must exist; anything else is rejected without
/// touching live state.
pub fn parse_import(json: &str) -> DayglowResult<(Value, u32)> {
    let parsed: Value = serde_json::from_str(json)
        .map_err(|err| DayglowError::storage(format!("parsing import: {err}")))?;

    let kind = parsed["format"]["type"].as_str();
    if kind != Some(WORLD_DATA_TYPE) {
        return Err(DayglowError::storage("Wrong file type."));
    }

    let version = parsed["format"]["version"].as_u64().unwrap_or(0) as u32;
    if version > WORLD_DATA_VERSION {
        return Err(DayglowError::storage("Wrong file version."));
    }

    match parsed.get("data") {
        Some(data) if !data.is_null() => Ok((data.clone(), version)),
        _ => Err(DayglowError::storage("Damaged file.")),
    }
}

/// Upgrade a data payload of any supported version to the current schema
/// and deserialize it. Shape problems that survive migration are logged,
/// not fatal; hard validation stays at the load boundaries.
pub fn ingest_value(value: Value, version: u32) -> DayglowResult<WorldData> {
    let value = if version < 2 {
        migrate::upgrade_to_v2(value)?
    } else {
        value
    };

    let mut data: WorldData = serde_json::from_value(value)
        .map_err(|err| DayglowError::storage(format!("deserializing world: {err}")))?;

    // Span ids were optional in early files.
    for mode in &mut data.modes {
        for i in 0..mode.mode_palette_infos.len() {
            if mode.mode_palette_infos[i].id == 0 {
                let id = next_id(&mode.mode_palette_infos, |span| span.id);
                mode.mode_palette_infos[i].id = id;
            }
        }
    }

    if let Err(err) = validate_shape(&data) {
        tracing::warn!(%err, "ingested world has shape problems");
    }

    Ok(data)
}

fn validate_shape(data: &WorldData) -> DayglowResult<()> {
    let expected = data.width as usize * data.height as usize;
    if !data.pixels.is_empty() && data.pixels.len() != expected {
        return Err(DayglowError::validation(format!(
            "base pixel count {} does not match {}x{}",
            data.pixels.len(),
            data.width,
            data.height
        )));
    }

    for overlay in &data.overlays {
        let expected = overlay.width as usize * overlay.height as usize;
        if overlay.pixels.len() != expected {
            return Err(DayglowError::validation(format!(
                "overlay '{}' pixel count {} does not match {}x{}",
                overlay.name,
                overlay.pixels.len(),
                overlay.width,
                overlay.height
            )));
        }
    }

    Ok(())
}

/// Pure per-version schema upgrades. Each step consumes a payload and
/// returns a new one; nothing is patched behind the caller's back.
pub(crate) mod migrate {
    use serde_json::Value;

    use crate::foundation::core::MAX_SECONDS;
    use crate::foundation::error::{DayglowError, DayglowResult};

    /// Pre-mode schema: palettes carried their own `startSeconds` /
    /// `endSeconds`. Moves those fields into a single synthetic mode's
    /// span list and strips them from the palettes.
    pub fn upgrade_to_v2(value: Value) -> DayglowResult<Value> {
        let mut root = value;
        let obj = root
            .as_object_mut()
            .ok_or_else(|| DayglowError::storage("world payload must be an object"))?;

        let mut spans: Vec<Value> = Vec::new();

        if let Some(Value::Array(palettes)) = obj.get_mut("paletteInfos") {
            for palette in palettes {
                let Some(palette) = palette.as_object_mut() else {
                    continue;
                };

                let start = palette.remove("startSeconds");
                let end = palette.remove("endSeconds");
                let (Some(start), Some(end)) = (start, end) else {
                    continue;
                };

                let Some(start_seconds) = start.as_f64() else {
                    continue;
                };
                let end_seconds = if end.is_null() {
                    MAX_SECONDS - 1.0
                } else {
                    match end.as_f64() {
                        Some(v) => v,
                        None => continue,
                    }
                };

                let palette_id = palette.get("id").and_then(Value::as_i64).unwrap_or(0);
                spans.push(serde_json::json!({
                    "id": spans.len() + 1,
                    "paletteId": palette_id,
                    "startSeconds": start_seconds.rem_euclid(MAX_SECONDS),
                    "endSeconds": end_seconds.rem_euclid(MAX_SECONDS),
                }));
            }
        }

        obj.insert(
            "modes".to_string(),
            serde_json::json!([{
                "id": 1,
                "name": "Mode 1",
                "modePaletteInfos": spans,
            }]),
        );

        Ok(root)
    }
}

/// Pluggable persistence for the serialized envelope. A world without a
/// store simply skips persistence.
pub trait WorldStore {
    /// Read the stored envelope, `None` when nothing was saved yet.
    fn load(&self) -> DayglowResult<Option<String>>;
    /// Replace the stored envelope.
    fn save(&self, serialized: &str) -> DayglowResult<()>;
}

/// File-backed store: one JSON envelope at a fixed path.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store writing to (and reading from) `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WorldStore for JsonFileStore {
    fn load(&self) -> DayglowResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|err| DayglowError::storage(format!("reading '{}': {err}", self.path.display())))
    }

    fn save(&self, serialized: &str) -> DayglowResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    DayglowError::storage(format!("creating '{}': {err}", parent.display()))
                })?;
            }
        }

        fs::write(&self.path, serialized)
            .map_err(|err| DayglowError::storage(format!("writing '{}': {err}", self.path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/world/store.rs"]
mod tests;
