//! Integration tests for reading the supported file formats

use rstest::{fixture, rstest};
use voltools_volumetric::{
    detect_format, parse_chgcar, parse_cube, read_volumetric, DataOrder, Error, FileFormat,
    VolumetricFileData,
};

#[fixture]
fn si_chgcar() -> VolumetricFileData {
    read_volumetric("./data/CHGCAR_si").unwrap()
}

#[fixture]
fn water_bohr() -> VolumetricFileData {
    read_volumetric("./data/water_bohr.cube").unwrap()
}

/// Minimal CHGCAR header with a customisable species/count section
fn chgcar_content(scale: &str, species: &str, mode: &str, atoms: &str) -> String {
    format!(
        "comment\n{scale}\n 2.0 0.0 0.0\n 0.0 2.0 0.0\n 0.0 0.0 2.0\n{species}\n{mode}\n{atoms}\n\n 1 1 2\n 8.0 16.0\n"
    )
}

#[rstest]
fn chgcar_structure(si_chgcar: VolumetricFileData) {
    let structure = &si_chgcar.structure;
    assert_eq!(structure.len(), 2);
    assert_eq!(structure.species(), vec!["Si"]);
    assert_eq!(structure.pbc, [true; 3]);
    assert_eq!(structure.lattice.lengths(), [2.0, 2.0, 2.0]);
    assert_eq!(structure.sites[1].abc, [0.25, 0.25, 0.25]);
    assert_eq!(structure.sites[1].xyz, [0.5, 0.5, 0.5]);
}

#[rstest]
fn chgcar_density(si_chgcar: VolumetricFileData) {
    assert_eq!(si_chgcar.volumes.len(), 1);

    let volume = &si_chgcar.volumes[0];
    assert_eq!(volume.label, "charge density");
    assert_eq!(volume.grid_dims(), [2, 2, 2]);
    assert_eq!(volume.data_order, DataOrder::XFastest);
    assert!(volume.periodic);

    // stored as rho * V with V = 8
    let grid = volume.grid();
    assert_eq!(grid.get(0, 0, 0), 1.0);
    assert_eq!(grid.get(1, 0, 0), 2.0);
    assert_eq!(grid.get(0, 1, 0), 3.0);
    assert_eq!(grid.get(0, 0, 1), 5.0);
    assert_eq!(grid.get(1, 1, 1), 8.0);

    let range = volume.data_range();
    assert_eq!((range.min, range.max, range.abs_max), (1.0, 8.0, 8.0));
    assert_eq!(range.mean, 4.5);
}

#[rstest]
fn chgcar_flat_order_is_preserved(si_chgcar: VolumetricFileData) {
    let expected: Vec<f64> = (1..=8).map(f64::from).collect();
    assert_eq!(si_chgcar.volumes[0].to_flat(), expected);
}

#[test]
fn chgcar_spin_blocks() {
    let data = read_volumetric("./data/CHGCAR_spin").unwrap();
    assert_eq!(data.structure.sites[0].species, "Fe");
    assert_eq!(data.volumes.len(), 2);
    assert_eq!(data.volumes[0].label, "charge density");
    assert_eq!(data.volumes[1].label, "magnetization density");
    assert!(data.volume("magnetization density").is_some());

    let range = data.volumes[1].data_range();
    assert_eq!((range.min, range.max, range.abs_max), (-1.0, 1.0, 1.0));
    assert_eq!(range.mean, 0.0);
}

#[test]
fn chgcar_truncated_block_is_padded() {
    let data = read_volumetric("./data/CHGCAR_truncated").unwrap();
    let volume = &data.volumes[0];
    assert_eq!(volume.grid_dims(), [3, 3, 3]);

    // 20 of 27 values present, the rest are zero and excluded from stats
    let values = volume.grid().values();
    assert_eq!(values.iter().filter(|v| **v == 1.0).count(), 20);
    assert_eq!(values.iter().filter(|v| **v == 0.0).count(), 7);
    assert_eq!(volume.data_range().mean, 1.0);
    assert_eq!(volume.data_range().min, 1.0);
}

#[test]
fn elfcar_is_not_scaled() {
    let data = read_volumetric("./data/ELFCAR").unwrap();
    let volume = &data.volumes[0];
    assert_eq!(volume.label, "electron localization function");
    assert_eq!(volume.data_range().max, 0.8);
    assert_eq!(volume.grid().get(1, 1, 1), 0.8);
}

#[test]
fn chgcar_without_symbols() {
    let content = chgcar_content("1.0", " 1 1", "Direct", " 0 0 0\n 0.5 0.5 0.5");
    let data = parse_chgcar(&content).unwrap();
    assert_eq!(data.structure.species(), vec!["H", "He"]);
    assert_eq!(data.volumes[0].grid().values(), &[1.0, 2.0]);
}

#[rstest]
#[case::unscaled("1.0", 1.0)]
#[case::doubled("2.0", 2.0)]
#[case::target_volume("-64.0", 2.0)]
#[case::small_volume("-1.0", 0.5)]
fn chgcar_cartesian_positions(#[case] scale: &str, #[case] factor: f64) {
    let content = chgcar_content(
        scale,
        " Na Cl\n 1 1",
        "Selective dynamics\nCartesian",
        " 0 0 0 T T T\n 1.0 1.0 -1.0 F F F",
    );
    let data = parse_chgcar(&content).unwrap();
    let site = &data.structure.sites[1];
    assert_eq!(site.species, "Cl");

    // positions scale with the lattice, then wrap back into the cell
    for (abc, xyz) in site.abc.iter().zip(site.xyz) {
        assert!((abc - 0.5).abs() < 1e-12, "{abc}");
        assert!((xyz - factor).abs() < 1e-12, "{xyz}");
    }
}

#[test]
fn chgcar_grid_round_trip() {
    let [nx, ny, nz] = [2, 3, 4];
    let f = |ix: usize, iy: usize, iz: usize| (ix * ny * nz + iy * nz + iz) as f64;

    // x fastest in the file
    let mut written = Vec::new();
    for iz in 0..nz {
        for iy in 0..ny {
            for ix in 0..nx {
                written.push(f(ix, iy, iz));
            }
        }
    }
    let block = written.iter().map(|v| format!(" {v:.1}")).collect::<String>();
    let content = format!(
        "unit cell\n1.0\n 1 0 0\n 0 1 0\n 0 0 1\n Si\n 1\nDirect\n 0 0 0\n\n {nx} {ny} {nz}\n{block}\n"
    );

    let data = parse_chgcar(&content).unwrap();
    let volume = &data.volumes[0];
    assert_eq!(volume.grid_dims(), [nx, ny, nz]);
    assert_eq!(volume.to_flat(), written);

    let grid = volume.grid();
    for ix in 0..nx {
        for iy in 0..ny {
            for iz in 0..nz {
                assert_eq!(grid.get(ix, iy, iz), f(ix, iy, iz), "({ix}, {iy}, {iz})");
            }
        }
    }
}

#[rstest]
#[case("4000000 4000000 4000000", [4_000_000; 3])]
#[case("100000 100000 1", [100_000, 100_000, 1])]
#[case("18446744073709551615 2 1", [usize::MAX, 2, 1])]
fn chgcar_oversized_grid(#[case] dims_line: &str, #[case] dims: [usize; 3]) {
    let content = format!(
        "c\n1.0\n 1 0 0\n 0 1 0\n 0 0 1\n Si\n 1\nDirect\n 0 0 0\n\n {dims_line}\n 1.0 2.0\n"
    );
    assert!(matches!(
        parse_chgcar(&content),
        Err(Error::InvalidGridDimensions(d)) if d == dims
    ));
}

#[test]
fn chgcar_overflowing_atom_counts() {
    let content = chgcar_content("1.0", " Na Cl\n 18446744073709551615 1", "Direct", " 0 0 0");
    assert!(matches!(
        parse_chgcar(&content),
        Err(Error::InvalidAtomCounts(_))
    ));
}

#[test]
fn chgcar_volume_scale_factor() {
    // a negative scale factor is the target cell volume
    let content = chgcar_content("-64.0", " Si\n 1", "Direct", " 0 0 0");
    let data = parse_chgcar(&content).unwrap();
    let volume = data.structure.lattice.volume();
    assert!((volume - 64.0).abs() < 1e-9);

    // values are divided by the scaled volume
    let values = data.volumes[0].grid().values();
    assert!((values[0] - 8.0 / 64.0).abs() < 1e-12);
}

#[rstest]
#[case("too\nshort\n")]
#[case("")]
fn chgcar_too_few_lines(#[case] content: &str) {
    assert!(matches!(
        parse_chgcar(content),
        Err(Error::TooFewLines { .. })
    ));
}

#[test]
fn chgcar_structural_failures() {
    let content = chgcar_content("abc", " Si\n 1", "Direct", " 0 0 0");
    assert!(matches!(
        parse_chgcar(&content),
        Err(Error::InvalidScaleFactor(_))
    ));

    // counts promise more atoms than there are lines left
    let content = "c\n1.0\n 1 0 0\n 0 1 0\n 0 0 1\n Si\n 12\nDirect\n 0 0 0\n 0 0 0\n";
    assert!(matches!(
        parse_chgcar(content),
        Err(Error::Truncated { .. })
    ));

    // structure only, no grid
    let content = "c\n1.0\n 1 0 0\n 0 1 0\n 0 0 1\n Si\n 2\nDirect\n 0 0 0\n 0.5 0.5 0.5\n\n";
    assert!(matches!(parse_chgcar(content), Err(Error::NoVolumes)));
}

#[rstest]
fn cube_units_agree(water_bohr: VolumetricFileData) {
    let angstrom = read_volumetric("./data/water_angstrom.cube").unwrap();

    let a = water_bohr.structure.lattice.rows();
    let b = angstrom.structure.lattice.rows();
    for (row_a, row_b) in a.iter().zip(b.iter()) {
        for (x, y) in row_a.iter().zip(row_b.iter()) {
            assert!((x - y).abs() < 1e-5, "{x} != {y}");
        }
    }

    for (site_a, site_b) in water_bohr.structure.sites.iter().zip(&angstrom.structure.sites) {
        assert_eq!(site_a.species, site_b.species);
        for (x, y) in site_a.xyz.iter().zip(site_b.xyz.iter()) {
            assert!((x - y).abs() < 1e-5, "{x} != {y}");
        }
    }

    assert_eq!(
        water_bohr.volumes[0].grid().values(),
        angstrom.volumes[0].grid().values()
    );
}

#[rstest]
fn cube_contents(water_bohr: VolumetricFileData) {
    let structure = &water_bohr.structure;
    assert_eq!(structure.species(), vec!["O", "H"]);
    assert_eq!(structure.len(), 3);

    let volume = &water_bohr.volumes[0];
    assert_eq!(volume.label, "water density");
    assert_eq!(volume.data_order, DataOrder::ZFastest);
    assert_eq!(volume.origin, [0.0; 3]);

    // z fastest in the file
    let grid = volume.grid();
    assert_eq!(grid.get(0, 0, 1), 2.0);
    assert_eq!(grid.get(0, 1, 0), 3.0);
    assert_eq!(grid.get(1, 0, 0), 5.0);
    assert_eq!(volume.to_flat(), (1..=8).map(f64::from).collect::<Vec<_>>());
}

#[test]
fn cube_periodicity() {
    let content = std::fs::read_to_string("./data/water_bohr.cube").unwrap();

    // origin at zero is inferred as periodic
    let data = parse_cube(&content, None).unwrap();
    assert!(data.volumes[0].periodic);
    assert_eq!(data.structure.pbc, [true; 3]);

    // explicit override
    let data = parse_cube(&content, Some(false)).unwrap();
    assert!(!data.volumes[0].periodic);

    // shifted origin is molecular, and atoms are relative to it
    let shifted = content.replacen(
        "    3    0.000000    0.000000    0.000000",
        "    3   -1.000000    0.000000    0.000000",
        1,
    );
    let data = parse_cube(&shifted, None).unwrap();
    assert!(!data.volumes[0].periodic);
    let bohr = 0.529177249;
    assert!((data.volumes[0].origin[0] + bohr).abs() < 1e-12);
    assert!((data.structure.sites[0].xyz[0] - bohr).abs() < 1e-12);
}

#[rstest]
#[case("./data/CHGCAR_si", FileFormat::Chgcar)]
#[case("./data/CHGCAR_spin", FileFormat::Chgcar)]
#[case("./data/ELFCAR", FileFormat::Chgcar)]
#[case("./data/water_bohr.cube", FileFormat::Cube)]
#[case("./data/water_angstrom.cube", FileFormat::Cube)]
fn detect_from_content(#[case] path: &str, #[case] expected: FileFormat) {
    let content = std::fs::read_to_string(path).unwrap();
    assert_eq!(detect_format(&content, None), Some(expected));
}
