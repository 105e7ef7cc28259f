//! Library of parser functions

// crate modules
use crate::error::Result;

// voltools modules
use voltools_utils::StringExt;

// nom parser combinators
use nom::character::complete::{i64 as signed, space0, space1, u64 as unsigned};
use nom::combinator::{all_consuming, map, opt};
use nom::multi::many1;
use nom::number::complete::double;
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

// ! Boolean checks
/// Check for a line holding exactly three non-negative integers
///
/// e.g. the grid dimensions line preceding every CHGCAR data block
/// ```text
///    24   24   36
/// ```
pub fn is_grid_dimensions(i: &str) -> bool {
    grid_dimensions(i).is_ok()
}

/// Check for the species symbol line of a POSCAR style header
pub fn is_symbol_line(i: &str) -> bool {
    i.starts_alphabetic()
}

/// Check for the optional `Selective dynamics` line
pub fn is_selective_dynamics(i: &str) -> bool {
    matches!(i.trim_start().chars().next(), Some('s' | 'S'))
}

/// Check for cartesian coordinates (`Cartesian`, `kartesisch`, etc...)
pub fn is_cartesian(i: &str) -> bool {
    matches!(i.trim_start().chars().next(), Some('c' | 'C' | 'k' | 'K'))
}

/// Count the tokens in a line that parse as numbers
pub fn numeric_token_count(i: &str) -> usize {
    i.split_whitespace()
        .filter(|t| t.parse::<f64>().is_ok())
        .count()
}

// ! Parser combinators

/// Three whitespace separated numbers, ignoring anything that follows
///
/// e.g. a lattice vector or atomic position, which may have trailing
/// selective dynamics flags or species labels
/// ```text
///   0.000000  2.715000  2.715000   T T F
/// ```
pub fn vector3(i: &str) -> IResult<&str, [f64; 3]> {
    map(
        tuple((
            preceded(space0, double),
            preceded(space1, double),
            preceded(space1, double),
        )),
        |(x, y, z)| [x, y, z],
    )(i)
}

/// The leading number of a line, e.g. the CHGCAR scale factor
pub fn leading_f64(i: &str) -> IResult<&str, f64> {
    preceded(space0, double)(i)
}

/// Exactly three unsigned integers and nothing else
pub fn grid_dimensions(i: &str) -> IResult<&str, [usize; 3]> {
    map(
        all_consuming(tuple((
            preceded(space0, unsigned),
            preceded(space1, unsigned),
            preceded(space1, unsigned),
            space0,
        ))),
        |(x, y, z, _)| [x as usize, y as usize, z as usize],
    )(i)
}

/// One or more unsigned integers, e.g. the atom counts per species
pub fn usize_list(i: &str) -> IResult<&str, Vec<usize>> {
    all_consuming(preceded(
        space0,
        many1(map(terminated(unsigned, space0), |n| n as usize)),
    ))(i)
}

/// One or more signed integers
pub fn i64_list(i: &str) -> IResult<&str, Vec<i64>> {
    all_consuming(preceded(space0, many1(terminated(signed, space0))))(i)
}

/// Cube header line with the atom count, origin, and optional values per point
///
/// ```text
///    -3    0.000000    0.000000    0.000000    1
/// ```
pub fn cube_header(i: &str) -> IResult<&str, (i64, [f64; 3], Option<i64>)> {
    let (i, n_atoms) = preceded(space0, signed)(i)?;
    let (i, origin) = vector3(i)?;
    let (i, n_values) = opt(preceded(space1, signed))(i)?;
    Ok((i, (n_atoms, origin, n_values)))
}

/// Cube voxel axis with the point count and step vector
///
/// ```text
///    40    0.283459    0.000000    0.000000
/// ```
pub fn cube_axis(i: &str) -> IResult<&str, (i64, [f64; 3])> {
    tuple((preceded(space0, signed), vector3))(i)
}

/// Cube atom line with atomic number, charge, and position
///
/// ```text
///     8    8.000000    0.000000    0.000000    0.221665
/// ```
pub fn cube_atom(i: &str) -> IResult<&str, (i64, f64, [f64; 3])> {
    tuple((
        preceded(space0, signed),
        preceded(space1, double),
        vector3,
    ))(i)
}

/// Run a line parser, converting a failure into a crate [Error](crate::Error)
pub fn parse_line<'a, T>(
    line: &'a str,
    mut parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> Result<T> {
    let (_, value) = parser(line)?;
    Ok(value)
}
