//! Building WCON from Tierpsy Tracker features.
//!
//! Reading the HDF5 features file is the caller's business. These helpers
//! take what was read (experiment info, unit conversions, per-worm skeletons
//! and contours) and lay it out the way Tierpsy's own WCON export does, with
//! Tierpsy-specific fields under the `@OMG` extension.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Extension key for Tierpsy (OpenWorm Movement Group) fields.
pub const OMG_EXTENSION_KEY: &str = "@OMG";

/// Metadata fields defined by WCON itself, in output order.
pub const WCON_METADATA_FIELDS: [&str; 16] = [
    "id",
    "lab",
    "who",
    "timestamp",
    "temperature",
    "humidity",
    "arena",
    "food",
    "media",
    "sex",
    "stage",
    "age",
    "strain",
    "protocol",
    "interpolate",
    "software",
];

/// Order in which experiment info is presented; anything else follows,
/// sorted by key.
pub const EXPERIMENT_INFO_ORDER: [&str; 17] = [
    "strain",
    "timestamp",
    "gene",
    "chromosome",
    "allele",
    "strain_description",
    "sex",
    "stage",
    "ventral_side",
    "media",
    "arena",
    "food",
    "habituation",
    "who",
    "protocol",
    "lab",
    "software",
];

const TIERPSY_NAME: &str = "tierpsy (https://github.com/ver228/tierpsy-tracker)";

// Points per frame are kept at full precision beyond this many decimals.
const MAX_DECIMALS: i32 = 15;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TierpsyError {
    #[error("frame rate must be positive, got {0}")]
    InvalidFps(f64),
    #[error("{series} has {found} frames, expected {expected}")]
    FrameCountMismatch {
        series: String,
        expected: usize,
        found: usize,
    },
}

/// Splits metadata into WCON fields and an `@OMG` object holding the rest.
///
/// An `@OMG` object already present in `metadata` is merged into the new
/// one. The `@OMG` key is always written, possibly empty.
pub fn reformat_metadata(metadata: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for field in WCON_METADATA_FIELDS {
        if let Some(value) = metadata.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }

    let mut omg = Map::new();
    for (key, value) in metadata {
        if key == OMG_EXTENSION_KEY || WCON_METADATA_FIELDS.contains(&key.as_str()) {
            continue;
        }
        omg.insert(key.clone(), value.clone());
    }
    if let Some(Value::Object(existing)) = metadata.get(OMG_EXTENSION_KEY) {
        for (key, value) in existing {
            omg.insert(key.clone(), value.clone());
        }
    }
    out.insert(OMG_EXTENSION_KEY.to_string(), Value::Object(omg));
    out
}

/// Orders experiment info by [`EXPERIMENT_INFO_ORDER`], then the remaining
/// keys alphabetically.
pub fn order_metadata(info: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for field in EXPERIMENT_INFO_ORDER {
        if let Some(value) = info.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }
    let mut extra: Vec<&String> = info
        .keys()
        .filter(|key| !EXPERIMENT_INFO_ORDER.contains(&key.as_str()))
        .collect();
    extra.sort();
    for key in extra {
        out.insert(key.clone(), info[key.as_str()].clone());
    }
    out
}

/// The `metadata.software` entry for a given Tierpsy version.
pub fn software_descriptor(version: &str) -> Value {
    let mut software = Map::new();
    software.insert("name".to_string(), Value::String(TIERPSY_NAME.to_string()));
    software.insert("version".to_string(), Value::String(version.to_string()));
    software.insert(
        "featureID".to_string(),
        Value::String(OMG_EXTENSION_KEY.to_string()),
    );
    Value::Object(software)
}

/// `"?"` when the ventral side is unknown. Known sides are reported as
/// `"CW"` because contours are emitted with the ventral side clockwise.
pub fn ventral_marker(side: Option<&str>) -> &'static str {
    match side {
        None | Some("") | Some("unknown") => "?",
        Some(_) => "CW",
    }
}

/// The `units` object for a track export. `feature_units` pairs are written
/// as `"@OMG <feature>"`.
pub fn units(
    time_unit: &str,
    xy_unit: &str,
    feature_units: &[(String, String)],
) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("size".to_string(), Value::String("mm".to_string()));
    out.insert("t".to_string(), Value::String(time_unit.to_string()));
    for field in ["x", "y", "px", "py"] {
        out.insert(field.to_string(), Value::String(xy_unit.to_string()));
    }
    for (feature, unit) in feature_units {
        out.insert(format!("{OMG_EXTENSION_KEY} {feature}"), Value::String(unit.clone()));
    }
    out
}

/// Decimal places kept for a series: the smallest `|e - 2|` over its finite
/// non-zero values, `e` being the value's decimal exponent, and never fewer
/// than two. `None` when there is nothing to round.
fn precision_for<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<i32> {
    values
        .into_iter()
        .filter(|v| v.is_finite() && **v != 0.0)
        .map(|v| (v.abs().log10().floor() - 2.0).abs() as i32)
        .min()
        .map(|p| p.max(2))
}

fn round_to(value: f64, precision: Option<i32>) -> Value {
    let rounded = match precision {
        Some(p) if p <= MAX_DECIMALS && value.is_finite() => {
            let scale = 10f64.powi(p);
            (value * scale).round_ties_even() / scale
        }
        _ => value,
    };
    // NaN and infinities have no JSON form.
    Number::from_f64(rounded).map_or(Value::Null, Value::Number)
}

/// Rounds a numeric series for WCON output.
///
/// NaN becomes `null`, and a single-element series collapses to a scalar.
pub fn reformat_series(values: &[f64]) -> Value {
    let precision = precision_for(values);
    if let [only] = values {
        return round_to(*only, precision);
    }
    Value::Array(values.iter().map(|v| round_to(*v, precision)).collect())
}

/// Per-frame variant of [`reformat_series`]: one list per frame, rounded with
/// a precision shared across all frames.
pub fn reformat_frames(frames: &[Vec<f64>]) -> Value {
    let precision = precision_for(frames.iter().flatten());
    if let [only] = frames {
        if let [value] = only.as_slice() {
            return round_to(*value, precision);
        }
    }
    Value::Array(
        frames
            .iter()
            .map(|frame| Value::Array(frame.iter().map(|v| round_to(*v, precision)).collect()))
            .collect(),
    )
}

/// One worm's trajectory as read from a features file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WormTrack {
    pub worm_id: u64,
    pub ventral_side: Option<String>,
    pub fps: f64,
    /// Frame number of each sample.
    pub frames: Vec<f64>,
    /// Skeleton points, one list per frame.
    pub skeletons: Vec<Vec<[f64; 2]>>,
    pub ventral_contours: Vec<Vec<[f64; 2]>>,
    pub dorsal_contours: Vec<Vec<[f64; 2]>>,
    /// Per-frame feature series, written as `"@OMG <name>"`.
    pub features: Vec<(String, Vec<f64>)>,
}

impl WormTrack {
    /// Lays the track out as a WCON data record.
    ///
    /// # Errors
    ///
    /// Fails when `fps` is not positive or a series does not have one entry
    /// per frame.
    pub fn into_record(self) -> Result<Value, TierpsyError> {
        if self.fps.is_nan() || self.fps <= 0.0 {
            return Err(TierpsyError::InvalidFps(self.fps));
        }
        let expected = self.frames.len();
        check_len("skeletons", expected, self.skeletons.len())?;
        check_len("ventral_contours", expected, self.ventral_contours.len())?;
        check_len("dorsal_contours", expected, self.dorsal_contours.len())?;
        for (name, series) in &self.features {
            check_len(name, expected, series.len())?;
        }

        let ptail = self
            .ventral_contours
            .first()
            .map_or(0, |contour| contour.len().saturating_sub(1));
        let times: Vec<f64> = self.frames.iter().map(|frame| frame / self.fps).collect();
        // Ventral side first, then the dorsal side walked backwards, so the
        // outline is one closed loop.
        let contours: Vec<Vec<[f64; 2]>> = self
            .ventral_contours
            .iter()
            .zip(&self.dorsal_contours)
            .map(|(ventral, dorsal)| ventral.iter().chain(dorsal.iter().rev()).copied().collect())
            .collect();

        let mut record = Map::new();
        record.insert("id".to_string(), Value::String(self.worm_id.to_string()));
        record.insert("head".to_string(), Value::String("L".to_string()));
        record.insert(
            "ventral".to_string(),
            Value::String(ventral_marker(self.ventral_side.as_deref()).to_string()),
        );
        record.insert("ptail".to_string(), Value::from(ptail));
        record.insert("t".to_string(), reformat_series(&times));
        record.insert("x".to_string(), reformat_frames(&axis(&self.skeletons, 0)));
        record.insert("y".to_string(), reformat_frames(&axis(&self.skeletons, 1)));
        record.insert("px".to_string(), reformat_frames(&axis(&contours, 0)));
        record.insert("py".to_string(), reformat_frames(&axis(&contours, 1)));
        for (name, series) in &self.features {
            record.insert(format!("{OMG_EXTENSION_KEY} {name}"), reformat_series(series));
        }
        Ok(Value::Object(record))
    }
}

fn check_len(series: &str, expected: usize, found: usize) -> Result<(), TierpsyError> {
    if expected == found {
        Ok(())
    } else {
        Err(TierpsyError::FrameCountMismatch {
            series: series.to_string(),
            expected,
            found,
        })
    }
}

fn axis(frames: &[Vec<[f64; 2]>], dim: usize) -> Vec<Vec<f64>> {
    frames
        .iter()
        .map(|points| points.iter().map(|p| p[dim]).collect())
        .collect()
}
