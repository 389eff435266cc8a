//! VTK XML support (`.vtp` PolyData and `.vtu` UnstructuredGrid).
//!
//! Only the ASCII encoding is supported. Surfaces must be made of triangles;
//! point data arrays must have a single component. Cell data and field data
//! are ignored on read.
//!
//! # Layout written
//!
//! ```text
//! VTKFile type="PolyData|UnstructuredGrid"
//!   Piece NumberOfPoints=.. NumberOfPolys|NumberOfCells=..
//!     PointData   one Float64 array per scalar field
//!     Points      Float64, 3 components
//!     Polys|Cells connectivity, offsets (Int64) [, types (UInt8)]
//! ```

use std::fmt::{Display, Write as _};
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use strain_types::{Point3, ScalarField, Surface, WedgeVolume};
use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::{IoError, IoResult};

/// VTK cell type id of a linear triangle.
pub const VTK_TRIANGLE: u8 = 5;
/// VTK cell type id of a linear wedge.
pub const VTK_WEDGE: u8 = 13;

const POLY_DATA: &str = "PolyData";
const UNSTRUCTURED_GRID: &str = "UnstructuredGrid";

/// Load a triangle surface from a `.vtp` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not ASCII VTK PolyData,
/// or contains non-triangle polygons or multi-component point data.
///
/// # Example
///
/// ```no_run
/// use strain_io::read_vtp;
///
/// let surface = read_vtp("receiver.vtp").unwrap();
/// println!("{} points", surface.point_count());
/// ```
pub fn read_vtp<P: AsRef<Path>>(path: P) -> IoResult<Surface> {
    read_with_kind(path.as_ref(), POLY_DATA)
}

/// Load a triangle surface from a `.vtu` file.
///
/// Every cell must be a triangle (VTK type 5).
///
/// # Errors
///
/// As for [`read_vtp`]; additionally fails on any other cell type.
pub fn read_vtu<P: AsRef<Path>>(path: P) -> IoResult<Surface> {
    read_with_kind(path.as_ref(), UNSTRUCTURED_GRID)
}

/// Save a surface as ASCII `.vtp` PolyData.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_vtp<P: AsRef<Path>>(surface: &Surface, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let xml = surface_xml(surface, POLY_DATA)?;
    write_atomic(path, &xml)?;
    debug!(path = %path.display(), points = surface.point_count(), "wrote vtp");
    Ok(())
}

/// Save a surface as an ASCII `.vtu` UnstructuredGrid of triangles.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_vtu<P: AsRef<Path>>(surface: &Surface, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let xml = surface_xml(surface, UNSTRUCTURED_GRID)?;
    write_atomic(path, &xml)?;
    debug!(path = %path.display(), points = surface.point_count(), "wrote vtu");
    Ok(())
}

/// Save a wedge volume as an ASCII `.vtu` UnstructuredGrid (VTK type 13).
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_volume_vtu<P: AsRef<Path>>(volume: &WedgeVolume, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let mut out = VtkWriter::new(UNSTRUCTURED_GRID)?;

    let mut piece = BytesStart::new("Piece");
    piece.push_attribute(("NumberOfPoints", volume.point_count().to_string().as_str()));
    piece.push_attribute(("NumberOfCells", volume.cell_count().to_string().as_str()));
    out.start(piece)?;

    out.point_data(std::slice::from_ref(volume.field()))?;
    out.points(volume.points())?;

    out.start(BytesStart::new("Cells"))?;
    out.data_array(
        "Int64",
        Some("connectivity"),
        1,
        &join(volume.cells().iter().flatten()),
    )?;
    out.data_array(
        "Int64",
        Some("offsets"),
        1,
        &join((1..=volume.cell_count()).map(|c| c * 6)),
    )?;
    out.data_array(
        "UInt8",
        Some("types"),
        1,
        &join(std::iter::repeat(VTK_WEDGE).take(volume.cell_count())),
    )?;
    out.end("Cells")?;

    out.end("Piece")?;
    write_atomic(path, &out.finish(UNSTRUCTURED_GRID)?)?;
    debug!(path = %path.display(), cells = volume.cell_count(), "wrote wedge volume");
    Ok(())
}

fn read_with_kind(path: &Path, kind: &str) -> IoResult<Surface> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    let surface = parse_surface(&content, kind)?;
    debug!(
        path = %path.display(),
        points = surface.point_count(),
        triangles = surface.triangle_count(),
        fields = surface.fields().len(),
        "read surface"
    );
    Ok(surface)
}

// =============================================================================
// Reading
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    PointData,
    Points,
    Topology,
    Ignored,
}

#[derive(Debug, Default)]
struct RawArray {
    name: Option<String>,
    components: usize,
    text: String,
}

impl RawArray {
    fn parse<T>(&self, what: &str) -> IoResult<Vec<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.text
            .split_ascii_whitespace()
            .map(|token| {
                token.parse().map_err(|e| {
                    IoError::invalid_content(format!("invalid {what} value {token:?}: {e}"))
                })
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct RawPiece {
    number_of_points: Option<usize>,
    points: Option<RawArray>,
    point_data: Vec<RawArray>,
    topology: Vec<RawArray>,
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> IoResult<Option<String>> {
    let attr = element
        .try_get_attribute(key)
        .map_err(|e| IoError::invalid_content(format!("malformed attribute: {e}")))?;
    attr.map(|a| {
        a.unescape_value()
            .map(std::borrow::Cow::into_owned)
            .map_err(|e| IoError::invalid_content(format!("malformed attribute value: {e}")))
    })
    .transpose()
}

fn count_attribute(element: &BytesStart<'_>, key: &[u8]) -> IoResult<Option<usize>> {
    attribute(element, key)?
        .map(|v| {
            v.trim().parse().map_err(|e| {
                IoError::invalid_content(format!(
                    "invalid {}: {e}",
                    String::from_utf8_lossy(key)
                ))
            })
        })
        .transpose()
}

fn open_array(element: &BytesStart<'_>) -> IoResult<RawArray> {
    let format = attribute(element, b"format")?.unwrap_or_else(|| "ascii".to_string());
    if format != "ascii" {
        return Err(IoError::invalid_content(format!(
            "unsupported DataArray format {format:?}; only ascii is supported"
        )));
    }
    Ok(RawArray {
        name: attribute(element, b"Name")?,
        components: count_attribute(element, b"NumberOfComponents")?.unwrap_or(1),
        text: String::new(),
    })
}

/// Parse an ASCII VTK XML document whose root is of type `kind`.
fn parse_surface(content: &str, kind: &str) -> IoResult<Surface> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut root_seen = false;
    let mut pieces = 0_usize;
    let mut piece = RawPiece::default();
    let mut section = Section::Outside;
    let mut array: Option<RawArray> = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                match e.local_name().as_ref() {
                    b"VTKFile" => {
                        let found = attribute(e, b"type")?.unwrap_or_default();
                        if found != kind {
                            return Err(IoError::invalid_content(format!(
                                "expected VTK {kind} file, found {found:?}"
                            )));
                        }
                        root_seen = true;
                    }
                    b"Piece" => {
                        pieces += 1;
                        if pieces > 1 {
                            return Err(IoError::invalid_content(
                                "multi-piece files are not supported",
                            ));
                        }
                        let others: [&[u8]; 3] =
                            [b"NumberOfVerts", b"NumberOfLines", b"NumberOfStrips"];
                        for key in others {
                            if count_attribute(e, key)?.unwrap_or(0) > 0 {
                                return Err(IoError::invalid_content(format!(
                                    "{} present; only triangle polygons are supported",
                                    String::from_utf8_lossy(key)
                                )));
                            }
                        }
                        piece.number_of_points = count_attribute(e, b"NumberOfPoints")?;
                    }
                    b"PointData" => section = Section::PointData,
                    b"Points" => section = Section::Points,
                    b"Polys" | b"Cells" => section = Section::Topology,
                    b"CellData" | b"FieldData" | b"Verts" | b"Lines" | b"Strips" => {
                        section = Section::Ignored;
                    }
                    b"AppendedData" => {
                        return Err(IoError::invalid_content(
                            "appended data is not supported",
                        ));
                    }
                    b"DataArray" => array = Some(open_array(e)?),
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"DataArray" {
                    let empty = open_array(e)?;
                    store_array(&mut piece, section, empty);
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(current) = array.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| IoError::invalid_content(format!("invalid text: {e}")))?;
                    current.text.push(' ');
                    current.text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"DataArray" => {
                    if let Some(done) = array.take() {
                        store_array(&mut piece, section, done);
                    }
                }
                b"PointData" | b"Points" | b"Polys" | b"Cells" | b"CellData" | b"FieldData"
                | b"Verts" | b"Lines" | b"Strips" => section = Section::Outside,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IoError::invalid_content(format!("XML parse error: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    if !root_seen {
        return Err(IoError::invalid_content("missing VTKFile root element"));
    }
    if pieces == 0 {
        return Err(IoError::invalid_content("file contains no Piece"));
    }
    build_surface(&piece, kind == UNSTRUCTURED_GRID)
}

fn store_array(piece: &mut RawPiece, section: Section, array: RawArray) {
    match section {
        Section::PointData => piece.point_data.push(array),
        Section::Points => piece.points = Some(array),
        Section::Topology => piece.topology.push(array),
        Section::Outside | Section::Ignored => {}
    }
}

fn topology_array<'a>(piece: &'a RawPiece, name: &str) -> Option<&'a RawArray> {
    piece
        .topology
        .iter()
        .find(|a| a.name.as_deref() == Some(name))
}

fn build_surface(piece: &RawPiece, typed_cells: bool) -> IoResult<Surface> {
    let points = match &piece.points {
        Some(array) => {
            if array.components != 3 {
                return Err(IoError::invalid_content(format!(
                    "points must have 3 components, found {}",
                    array.components
                )));
            }
            let coords: Vec<f64> = array.parse("coordinate")?;
            if coords.len() % 3 != 0 {
                return Err(IoError::invalid_content(format!(
                    "coordinate count {} is not a multiple of 3",
                    coords.len()
                )));
            }
            coords
                .chunks_exact(3)
                .map(|c| Point3::new(c[0], c[1], c[2]))
                .collect()
        }
        None => Vec::new(),
    };
    if let Some(expected) = piece.number_of_points {
        if expected != points.len() {
            return Err(IoError::invalid_content(format!(
                "NumberOfPoints is {expected} but {} points were read",
                points.len()
            )));
        }
    }

    let connectivity: Vec<u32> = match topology_array(piece, "connectivity") {
        Some(a) => a.parse("connectivity")?,
        None => Vec::new(),
    };
    let offsets: Vec<usize> = match topology_array(piece, "offsets") {
        Some(a) => a.parse("offset")?,
        None => Vec::new(),
    };
    let types: Option<Vec<u8>> = if typed_cells {
        match topology_array(piece, "types") {
            Some(a) => Some(a.parse("cell type")?),
            None if offsets.is_empty() => Some(Vec::new()),
            None => return Err(IoError::invalid_content("missing cell types array")),
        }
    } else {
        None
    };
    let triangles = triangles_from(&connectivity, &offsets, types.as_deref())?;

    let mut surface = Surface::new(points, triangles)?;
    for array in &piece.point_data {
        let name = array
            .name
            .clone()
            .ok_or_else(|| IoError::invalid_content("point data array without a Name"))?;
        if array.components != 1 {
            return Err(IoError::invalid_content(format!(
                "point data array {name:?} has {} components; only scalars are supported",
                array.components
            )));
        }
        let values = array.parse(&name)?;
        surface = surface.with_field(name, values)?;
    }
    Ok(surface)
}

fn triangles_from(
    connectivity: &[u32],
    offsets: &[usize],
    types: Option<&[u8]>,
) -> IoResult<Vec<[u32; 3]>> {
    if let Some(types) = types {
        if types.len() != offsets.len() {
            return Err(IoError::invalid_content(format!(
                "{} cell types for {} cells",
                types.len(),
                offsets.len()
            )));
        }
    }

    let mut triangles = Vec::with_capacity(offsets.len());
    let mut start = 0;
    for (cell, &end) in offsets.iter().enumerate() {
        if end < start || end > connectivity.len() {
            return Err(IoError::invalid_content(format!(
                "cell {cell} has invalid offset {end}"
            )));
        }
        if let Some(&ty) = types.and_then(|t| t.get(cell)) {
            if ty != VTK_TRIANGLE {
                return Err(IoError::invalid_content(format!(
                    "cell {cell} has VTK type {ty}; only triangles are supported"
                )));
            }
        }
        let ids = &connectivity[start..end];
        if ids.len() != 3 {
            return Err(IoError::invalid_content(format!(
                "polygon {cell} has {} vertices; only triangles are supported",
                ids.len()
            )));
        }
        triangles.push([ids[0], ids[1], ids[2]]);
        start = end;
    }
    if start != connectivity.len() {
        return Err(IoError::invalid_content(
            "connectivity has entries beyond the last offset",
        ));
    }
    Ok(triangles)
}

// =============================================================================
// Writing
// =============================================================================

fn xml_error(e: impl Display) -> IoError {
    IoError::invalid_content(format!("failed to write XML: {e}"))
}

fn join<T: Display>(values: impl IntoIterator<Item = T>) -> String {
    let mut out = String::new();
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing into a String cannot fail
        let _ = write!(out, "{v}");
    }
    out
}

struct VtkWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl VtkWriter {
    fn new(kind: &str) -> IoResult<Self> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
            .map_err(xml_error)?;
        let mut root = BytesStart::new("VTKFile");
        root.push_attribute(("type", kind));
        root.push_attribute(("version", "1.0"));
        root.push_attribute(("byte_order", "LittleEndian"));
        root.push_attribute(("header_type", "UInt64"));
        let mut out = Self { writer };
        out.start(root)?;
        out.start(BytesStart::new(kind))?;
        Ok(out)
    }

    fn start(&mut self, element: BytesStart<'_>) -> IoResult<()> {
        self.writer
            .write_event(Event::Start(element))
            .map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> IoResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn data_array(
        &mut self,
        ty: &str,
        name: Option<&str>,
        components: usize,
        text: &str,
    ) -> IoResult<()> {
        let mut element = BytesStart::new("DataArray");
        element.push_attribute(("type", ty));
        if let Some(name) = name {
            element.push_attribute(("Name", name));
        }
        if components != 1 {
            element.push_attribute(("NumberOfComponents", components.to_string().as_str()));
        }
        element.push_attribute(("format", "ascii"));
        self.start(element)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)?;
        self.end("DataArray")
    }

    fn point_data(&mut self, fields: &[ScalarField]) -> IoResult<()> {
        let mut element = BytesStart::new("PointData");
        if let Some(first) = fields.first() {
            element.push_attribute(("Scalars", first.name()));
        }
        self.start(element)?;
        for field in fields {
            self.data_array("Float64", Some(field.name()), 1, &join(field.values()))?;
        }
        self.end("PointData")
    }

    fn points(&mut self, points: &[Point3<f64>]) -> IoResult<()> {
        self.start(BytesStart::new("Points"))?;
        let coords = points.iter().flat_map(|p| [p.x, p.y, p.z]);
        self.data_array("Float64", Some("Points"), 3, &join(coords))?;
        self.end("Points")
    }

    fn finish(mut self, kind: &str) -> IoResult<Vec<u8>> {
        self.end(kind)?;
        self.end("VTKFile")?;
        Ok(self.writer.into_inner().into_inner())
    }
}

fn surface_xml(surface: &Surface, kind: &str) -> IoResult<Vec<u8>> {
    let grid = kind == UNSTRUCTURED_GRID;
    let mut out = VtkWriter::new(kind)?;

    let mut piece = BytesStart::new("Piece");
    piece.push_attribute(("NumberOfPoints", surface.point_count().to_string().as_str()));
    let cells = surface.triangle_count().to_string();
    if grid {
        piece.push_attribute(("NumberOfCells", cells.as_str()));
    } else {
        for key in ["NumberOfVerts", "NumberOfLines", "NumberOfStrips"] {
            piece.push_attribute((key, "0"));
        }
        piece.push_attribute(("NumberOfPolys", cells.as_str()));
    }
    out.start(piece)?;

    out.point_data(surface.fields())?;
    out.points(surface.points())?;

    let topology = if grid { "Cells" } else { "Polys" };
    out.start(BytesStart::new(topology))?;
    out.data_array(
        "Int64",
        Some("connectivity"),
        1,
        &join(surface.triangles().iter().flatten()),
    )?;
    out.data_array(
        "Int64",
        Some("offsets"),
        1,
        &join((1..=surface.triangle_count()).map(|t| t * 3)),
    )?;
    if grid {
        out.data_array(
            "UInt8",
            Some("types"),
            1,
            &join(std::iter::repeat(VTK_TRIANGLE).take(surface.triangle_count())),
        )?;
    }
    out.end(topology)?;

    out.end("Piece")?;
    out.finish(kind)
}
