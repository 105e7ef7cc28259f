//! Integration tests for layer planning and mesh extraction

use rstest::{fixture, rstest};
use voltools_isosurface::{
    extract_layers, generate_layers, IsosurfaceSettings, Lobe, MarchingCubesOutput,
};
use voltools_volumetric::{DataRange, Grid, Lattice, VolumetricData};

#[fixture]
fn volume() -> VolumetricData {
    let grid = Grid::from_fn([4, 4, 4], |ix, iy, iz| ix as f64 - iy as f64 + iz as f64);
    VolumetricData::new(grid, Lattice::cubic(4.0))
}

/// Stand-in for marching cubes: one quad for positive values, nothing else
fn quad_for_positive(_: &VolumetricData, isovalue: f64) -> MarchingCubesOutput {
    if isovalue <= 0.0 {
        return MarchingCubesOutput::default();
    }
    MarchingCubesOutput {
        vertices: vec![
            [0.0, 0.0, isovalue],
            [1.0, 0.0, isovalue],
            [1.0, 1.0, isovalue],
            [0.0, 1.0, isovalue],
        ],
        faces: vec![vec![0, 1, 2, 3]],
        normals: None,
    }
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(8)]
fn generated_layers_are_increasing(#[case] count: usize) {
    let range = DataRange::from_values([-10.0, 4.0]);
    let layers = generate_layers(count, &range, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);

    assert_eq!(layers.len(), count);
    assert!(layers.windows(2).all(|w| w[0].isovalue < w[1].isovalue));
    assert!(layers.iter().all(|l| l.isovalue > 0.0 && l.isovalue <= 10.0));
    assert!(layers.iter().all(|l| l.visible && l.color == [1.0, 0.0, 0.0]));
}

#[rstest]
fn three_layers_from_volume(volume: VolumetricData) {
    let abs_max = volume.data_range().abs_max;
    let settings = IsosurfaceSettings::default().with_layer_count(3, volume.data_range());
    let layers = settings.effective_layers();

    assert_eq!(layers.len(), 3);
    assert!(layers.iter().all(|l| l.isovalue > 0.0 && l.isovalue <= abs_max));
}

#[rstest]
fn empty_negative_lobes_are_omitted(volume: VolumetricData) {
    let settings = IsosurfaceSettings {
        show_negative: true,
        ..IsosurfaceSettings::default().with_layer_count(2, volume.data_range())
    };
    // negative flags are copied into generated layers when the count changes
    let settings = settings.with_layer_count(2, volume.data_range());

    let meshes = extract_layers(&volume, &settings, &quad_for_positive);
    assert_eq!(meshes.len(), 2);
    assert!(meshes.iter().all(|m| m.pass.lobe == Lobe::Positive));
    assert!(meshes[0].pass.isovalue < meshes[1].pass.isovalue);

    for layer in &meshes {
        assert_eq!(layer.mesh.vertex_count(), 4);
        assert_eq!(layer.mesh.triangle_count(), 2);
        assert_eq!(layer.mesh.positions[2] as f64, layer.pass.isovalue as f32 as f64);
    }
}

#[rstest]
fn both_lobes_extracted(volume: VolumetricData) {
    let settings = IsosurfaceSettings {
        isovalue: 0.5,
        show_negative: true,
        ..Default::default()
    };

    let mirrored = |_: &VolumetricData, isovalue: f64| quad_for_positive(&volume, isovalue.abs());
    let meshes = extract_layers(&volume, &settings, &mirrored);

    let lobes: Vec<(Lobe, f64)> = meshes.iter().map(|m| (m.pass.lobe, m.pass.isovalue)).collect();
    assert_eq!(lobes, vec![(Lobe::Positive, 0.5), (Lobe::Negative, -0.5)]);
    assert_eq!(meshes[1].pass.color, settings.negative_color);
}

#[rstest]
fn hidden_layers_are_not_extracted(volume: VolumetricData) {
    let mut settings = IsosurfaceSettings::default().with_layer_count(2, volume.data_range());
    if let Some(layers) = settings.layers.as_mut() {
        layers.iter_mut().for_each(|l| l.visible = false);
    }

    assert!(extract_layers(&volume, &settings, &quad_for_positive).is_empty());
}
