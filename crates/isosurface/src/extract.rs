//! Planning and running isosurface extraction for every layer

// crate modules
use crate::mesh::{build_mesh, MarchingCubesOutput, MeshBuffers};
use crate::settings::IsosurfaceSettings;

// voltools modules
use voltools_utils::{f, ValueExt};
use voltools_volumetric::VolumetricData;

// external crates
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;

/// Which side of zero a surface is drawn for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lobe {
    /// Surface at `+isovalue`
    Positive,
    /// Mirrored surface at `-isovalue`
    Negative,
}

/// A single marching cubes call and how to draw its result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsosurfacePass {
    /// Index of the source layer in the effective layer list
    pub layer: usize,
    /// Positive or negative lobe
    pub lobe: Lobe,
    /// Value passed to the extractor, already negated for negative lobes
    pub isovalue: f64,
    /// Colour for this lobe
    pub color: [f32; 3],
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Draw as a wireframe
    pub wireframe: bool,
}

impl std::fmt::Display for IsosurfacePass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let lobe = match self.lobe {
            Lobe::Positive => "+",
            Lobe::Negative => "-",
        };
        write!(
            f,
            "{}",
            f!("layer {} ({lobe}) at {}", self.layer, self.isovalue.sci(4, 2))
        )
    }
}

/// Seam to an external marching cubes implementation
///
/// Any `Fn(&VolumetricData, f64) -> MarchingCubesOutput` that can be shared
/// between threads is an extractor.
///
/// ```rust
/// # use voltools_isosurface::{IsosurfaceExtractor, MarchingCubesOutput};
/// # use voltools_volumetric::{Grid, Lattice, VolumetricData};
/// let extractor = |_: &VolumetricData, _: f64| MarchingCubesOutput::default();
///
/// let volume = VolumetricData::new(Grid::zeros([2, 2, 2]), Lattice::cubic(1.0));
/// assert!(extractor.extract(&volume, 0.5).vertices.is_empty());
/// ```
pub trait IsosurfaceExtractor: Sync {
    /// Extract the surface of `volume` at `isovalue`
    fn extract(&self, volume: &VolumetricData, isovalue: f64) -> MarchingCubesOutput;
}

impl<F> IsosurfaceExtractor for F
where
    F: Fn(&VolumetricData, f64) -> MarchingCubesOutput + Sync,
{
    fn extract(&self, volume: &VolumetricData, isovalue: f64) -> MarchingCubesOutput {
        self(volume, isovalue)
    }
}

/// Mesh buffers for one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerMesh {
    /// The pass this mesh was extracted for
    pub pass: IsosurfacePass,
    /// Renderer-ready buffers
    pub mesh: MeshBuffers,
}

/// Every extraction call needed for the settings, in drawing order
///
/// Hidden layers are dropped and the rest sorted by ascending isovalue so
/// that nested transparent shells composite correctly. Each layer gives a
/// positive pass, followed by a negative pass at `-isovalue` if
/// `show_negative` is set.
///
/// ```rust
/// # use voltools_isosurface::{plan_passes, IsosurfaceSettings, Lobe};
/// let settings = IsosurfaceSettings {
///     isovalue: 0.1,
///     show_negative: true,
///     ..Default::default()
/// };
///
/// let passes = plan_passes(&settings);
/// assert_eq!(passes.len(), 2);
/// assert_eq!((passes[0].lobe, passes[0].isovalue), (Lobe::Positive, 0.1));
/// assert_eq!((passes[1].lobe, passes[1].isovalue), (Lobe::Negative, -0.1));
/// ```
pub fn plan_passes(settings: &IsosurfaceSettings) -> Vec<IsosurfacePass> {
    let mut layers = settings
        .effective_layers()
        .into_iter()
        .enumerate()
        .filter(|(_, layer)| layer.visible)
        .filter(|(i, layer)| {
            let finite = layer.isovalue.is_finite();
            if !finite {
                warn!("Skipping layer {i} with isovalue {}", layer.isovalue);
            }
            finite
        })
        .collect::<Vec<_>>();

    // stable, so equal isovalues keep their configured order
    layers.sort_by(|(_, a), (_, b)| a.isovalue.total_cmp(&b.isovalue));

    layers
        .into_iter()
        .flat_map(|(index, layer)| {
            let positive = IsosurfacePass {
                layer: index,
                lobe: Lobe::Positive,
                isovalue: layer.isovalue,
                color: layer.color,
                opacity: layer.opacity,
                wireframe: settings.wireframe,
            };
            let negative = layer.show_negative.then(|| IsosurfacePass {
                lobe: Lobe::Negative,
                isovalue: -layer.isovalue,
                color: layer.negative_color,
                ..positive.clone()
            });
            std::iter::once(positive).chain(negative)
        })
        .collect()
}

/// Extract meshes for every pass in parallel
///
/// Results are in the same order as [plan_passes()]. Passes that produce
/// nothing to draw are left out rather than returned as empty meshes.
pub fn extract_layers<E: IsosurfaceExtractor>(
    volume: &VolumetricData,
    settings: &IsosurfaceSettings,
    extractor: &E,
) -> Vec<LayerMesh> {
    let passes = plan_passes(settings);
    debug!("Extracting {} isosurface passes", passes.len());

    passes
        .into_par_iter()
        .filter_map(|pass| {
            let output = extractor.extract(volume, pass.isovalue);
            let mesh = build_mesh(&output)?;
            debug!("{pass}: {} triangles", mesh.triangle_count());
            Some(LayerMesh { pass, mesh })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::IsosurfaceLayer;

    fn layer(isovalue: f64, visible: bool, show_negative: bool) -> IsosurfaceLayer {
        IsosurfaceLayer {
            isovalue,
            visible,
            show_negative,
            ..Default::default()
        }
    }

    #[test]
    fn passes_sorted_and_filtered() {
        let settings = IsosurfaceSettings {
            layers: Some(vec![
                layer(0.5, true, false),
                layer(0.1, true, true),
                layer(0.3, false, true),
                layer(f64::NAN, true, false),
            ]),
            ..Default::default()
        };

        let passes = plan_passes(&settings);
        let summary: Vec<(usize, Lobe, f64)> =
            passes.iter().map(|p| (p.layer, p.lobe, p.isovalue)).collect();
        assert_eq!(
            summary,
            vec![
                (1, Lobe::Positive, 0.1),
                (1, Lobe::Negative, -0.1),
                (0, Lobe::Positive, 0.5),
            ]
        );
    }

    #[test]
    fn negative_pass_colours() {
        let settings = IsosurfaceSettings {
            show_negative: true,
            wireframe: true,
            ..Default::default()
        };
        let passes = plan_passes(&settings);
        assert_eq!(passes[0].color, settings.positive_color);
        assert_eq!(passes[1].color, settings.negative_color);
        assert!(passes.iter().all(|p| p.wireframe));
    }

    #[test]
    fn pass_display() {
        let settings = IsosurfaceSettings {
            isovalue: 0.25,
            show_negative: true,
            ..Default::default()
        };
        let passes = plan_passes(&settings);
        assert_eq!(passes[0].to_string(), "layer 0 (+) at 2.5000e-01");
        assert_eq!(passes[1].to_string(), "layer 0 (-) at -2.5000e-01");
    }

    #[test]
    fn empty_layer_list_plans_nothing() {
        let settings = IsosurfaceSettings {
            layers: Some(Vec::new()),
            ..Default::default()
        };
        assert!(plan_passes(&settings).is_empty());
    }
}
