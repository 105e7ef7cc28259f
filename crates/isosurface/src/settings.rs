//! Isosurface display settings and layer generation

// crate modules
use crate::error::{Error, Result};

// voltools modules
use voltools_volumetric::DataRange;

// external crates
use log::warn;
use serde::{Deserialize, Serialize};

/// Lowest generated isovalue as a fraction of the largest magnitude
const LAYER_FLOOR: f64 = 0.05;

/// One isosurface shell at a single isovalue
///
/// Colours are linear RGB in `[0, 1]`. With `show_negative` the mirrored
/// surface at `-isovalue` is drawn as well, in `negative_color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsosurfaceLayer {
    /// Surface value, the negative lobe uses `-isovalue`
    pub isovalue: f64,
    /// Colour of the positive lobe
    pub color: [f32; 3],
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Hidden layers are not extracted at all
    pub visible: bool,
    /// Also extract the negative lobe
    pub show_negative: bool,
    /// Colour of the negative lobe
    pub negative_color: [f32; 3],
}

impl Default for IsosurfaceLayer {
    fn default() -> Self {
        Self {
            isovalue: 0.05,
            color: POSITIVE_COLOR,
            opacity: 0.7,
            visible: true,
            show_negative: false,
            negative_color: NEGATIVE_COLOR,
        }
    }
}

const POSITIVE_COLOR: [f32; 3] = [1.0, 0.85, 0.0];
const NEGATIVE_COLOR: [f32; 3] = [0.0, 0.6, 1.0];

/// Everything needed to decide which isosurfaces to extract
///
/// Without explicit `layers`, the top-level fields describe a single layer.
/// Every field has a default so that partial JSON is accepted.
///
/// ```rust
/// # use voltools_isosurface::IsosurfaceSettings;
/// let settings = IsosurfaceSettings::from_json(r#"{"isovalue": 0.2, "show_negative": true}"#).unwrap();
///
/// let layers = settings.effective_layers();
/// assert_eq!(layers.len(), 1);
/// assert_eq!(layers[0].isovalue, 0.2);
/// assert!(layers[0].show_negative);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsosurfaceSettings {
    /// Isovalue of the implicit single layer
    pub isovalue: f64,
    /// Opacity of the implicit single layer
    pub opacity: f32,
    /// Colour of positive lobes
    pub positive_color: [f32; 3],
    /// Colour of negative lobes
    pub negative_color: [f32; 3],
    /// Also extract negative lobes
    pub show_negative: bool,
    /// Draw meshes as wireframes
    pub wireframe: bool,
    /// Explicit layers, replacing the implicit single layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<IsosurfaceLayer>>,
}

impl Default for IsosurfaceSettings {
    fn default() -> Self {
        let layer = IsosurfaceLayer::default();
        Self {
            isovalue: layer.isovalue,
            opacity: layer.opacity,
            positive_color: layer.color,
            negative_color: layer.negative_color,
            show_negative: layer.show_negative,
            wireframe: false,
            layers: None,
        }
    }
}

impl IsosurfaceSettings {
    /// Deserialise and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialise to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every layer has a finite isovalue and a valid opacity
    pub fn validate(&self) -> Result<()> {
        for layer in self.effective_layers() {
            if !layer.isovalue.is_finite() {
                return Err(Error::InvalidIsovalue(layer.isovalue));
            }
            if !(0.0..=1.0).contains(&layer.opacity) {
                return Err(Error::InvalidOpacity(layer.opacity));
            }
        }
        Ok(())
    }

    /// The layers to draw, deriving one from the top-level fields if needed
    pub fn effective_layers(&self) -> Vec<IsosurfaceLayer> {
        match &self.layers {
            Some(layers) => layers.clone(),
            None => vec![IsosurfaceLayer {
                isovalue: self.isovalue,
                color: self.positive_color,
                opacity: self.opacity,
                visible: true,
                show_negative: self.show_negative,
                negative_color: self.negative_color,
            }],
        }
    }

    /// New settings with `count` layers spread over the data range
    ///
    /// Generated layers take their opacity and negative lobe flag from these
    /// settings. A count of zero, or a range with nothing to draw, returns to
    /// single layer mode.
    ///
    /// ```rust
    /// # use voltools_isosurface::IsosurfaceSettings;
    /// # use voltools_volumetric::DataRange;
    /// let range = DataRange::from_values([-2.0, 0.0, 4.0]);
    /// let settings = IsosurfaceSettings::default().with_layer_count(4, &range);
    /// assert_eq!(settings.effective_layers().len(), 4);
    /// ```
    pub fn with_layer_count(&self, count: usize, range: &DataRange) -> Self {
        let layers = generate_layers(count, range, self.positive_color, self.negative_color)
            .into_iter()
            .map(|layer| IsosurfaceLayer {
                opacity: self.opacity,
                show_negative: self.show_negative,
                ..layer
            })
            .collect::<Vec<_>>();

        Self {
            layers: (!layers.is_empty()).then_some(layers),
            ..self.clone()
        }
    }
}

/// Evenly spaced layers from a small floor up towards the largest magnitude
///
/// Isovalues are strictly increasing and all lie within `(0, abs_max)`. The
/// lowest is at 5% of `abs_max`, the highest one step short of it where the
/// surface would vanish. No layers are generated for a zero count or a
/// range without any magnitude.
///
/// ```rust
/// # use voltools_isosurface::generate_layers;
/// # use voltools_volumetric::DataRange;
/// let range = DataRange::from_values([-10.0, 2.0]);
/// let layers = generate_layers(3, &range, [1.0, 1.0, 0.0], [0.0, 0.0, 1.0]);
///
/// assert_eq!(layers.len(), 3);
/// assert!(layers.windows(2).all(|w| w[0].isovalue < w[1].isovalue));
/// assert!(layers.iter().all(|l| l.isovalue > 0.0 && l.isovalue <= 10.0));
/// ```
pub fn generate_layers(
    count: usize,
    range: &DataRange,
    positive_color: [f32; 3],
    negative_color: [f32; 3],
) -> Vec<IsosurfaceLayer> {
    let abs_max = range.abs_max;
    if count == 0 {
        return Vec::new();
    }
    if !abs_max.is_finite() || abs_max <= 0.0 {
        warn!("Cannot generate isosurface layers for a data range of {range}");
        return Vec::new();
    }

    let floor = abs_max * LAYER_FLOOR;
    let step = (abs_max - floor) / count as f64;

    (0..count)
        .map(|i| IsosurfaceLayer {
            isovalue: floor + step * i as f64,
            color: positive_color,
            negative_color,
            ..Default::default()
        })
        .collect()
}
