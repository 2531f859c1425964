//! Per-vertex data for the scene's meshes.

use std::borrow::Cow;

use note60_engine::gfx::GraphicsApi;

use crate::error::{GeometryError, SceneError};

pub const POSITION_COMPONENTS: usize = 3;
pub const NORMAL_COMPONENTS: usize = 3;
pub const COLOR_COMPONENTS: usize = 4;

// ── layout data ───────────────────────────────────────────────────────────

/// Unit quad in the XY plane, facing +Z, two triangles.
#[rustfmt::skip]
const NOTE_COORDS: [f32; 18] = [
    -1.0, 1.0, 0.0,
    1.0, -1.0, 0.0,
    -1.0, -1.0, 0.0,
    -1.0, 1.0, 0.0,
    1.0, 1.0, 0.0,
    1.0, -1.0, 0.0,
];

#[rustfmt::skip]
const NOTE_NORMALS: [f32; 18] = [
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
    0.0, 0.0, 1.0,
];

#[rustfmt::skip]
const NOTE_COLORS: [f32; 24] = [
    1.0, 1.0, 0.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
];

#[rustfmt::skip]
const FLOOR_COORDS: [f32; 18] = [
    200.0, 0.0, -200.0,
    -200.0, 0.0, -200.0,
    -200.0, 0.0, 200.0,
    200.0, 0.0, -200.0,
    -200.0, 0.0, 200.0,
    200.0, 0.0, 200.0,
];

#[rustfmt::skip]
const FLOOR_NORMALS: [f32; 18] = [
    0.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 1.0, 0.0,
];

#[rustfmt::skip]
const FLOOR_COLORS: [f32; 24] = [
    0.0, 0.3398, 0.9023, 1.0,
    0.0, 0.3398, 0.9023, 1.0,
    0.0, 0.3398, 0.9023, 1.0,
    0.0, 0.3398, 0.9023, 1.0,
    0.0, 0.3398, 0.9023, 1.0,
    0.0, 0.3398, 0.9023, 1.0,
];

// ── cpu side ──────────────────────────────────────────────────────────────

/// Positions, normals and colours of a triangle list.
///
/// Validated once at construction and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffer {
    positions: Cow<'static, [f32]>,
    normals: Cow<'static, [f32]>,
    colors: Cow<'static, [f32]>,
    vertex_count: usize,
}

impl GeometryBuffer {
    pub fn new(
        positions: impl Into<Cow<'static, [f32]>>,
        normals: impl Into<Cow<'static, [f32]>>,
        colors: impl Into<Cow<'static, [f32]>>,
    ) -> Result<Self, GeometryError> {
        let positions = positions.into();
        let normals = normals.into();
        let colors = colors.into();

        let p = vertices("positions", &positions, POSITION_COMPONENTS)?;
        let n = vertices("normals", &normals, NORMAL_COMPONENTS)?;
        let c = vertices("colors", &colors, COLOR_COMPONENTS)?;

        if p != n || p != c {
            return Err(GeometryError::CountMismatch {
                positions: p,
                normals: n,
                colors: c,
            });
        }
        if p == 0 {
            return Err(GeometryError::Empty);
        }

        Ok(Self {
            positions,
            normals,
            colors,
            vertex_count: p,
        })
    }

    /// The note quad.
    pub fn note() -> Self {
        Self::from_static(&NOTE_COORDS, &NOTE_NORMALS, &NOTE_COLORS)
    }

    /// The floor: a 400x400 square at y = 0.
    pub fn floor() -> Self {
        Self::from_static(&FLOOR_COORDS, &FLOOR_NORMALS, &FLOOR_COLORS)
    }

    // Built-in tables are consistent by construction; checked in tests.
    fn from_static(
        positions: &'static [f32],
        normals: &'static [f32],
        colors: &'static [f32],
    ) -> Self {
        Self {
            positions: Cow::Borrowed(positions),
            normals: Cow::Borrowed(normals),
            colors: Cow::Borrowed(colors),
            vertex_count: positions.len() / POSITION_COMPONENTS,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Position of vertex `i`.
    pub fn position(&self, i: usize) -> Option<[f32; 3]> {
        let start = i.checked_mul(3)?;
        let s = self.positions.get(start..start.checked_add(3)?)?;
        Some([s[0], s[1], s[2]])
    }

    /// Copies the three arrays into GL vertex buffers.
    pub fn upload<G: GraphicsApi>(&self, gfx: &mut G) -> Result<GpuGeometry<G>, SceneError> {
        let mut upload = |data: &[f32]| -> Result<G::Buffer, SceneError> {
            let buffer = gfx.create_buffer().map_err(SceneError::Buffer)?;
            gfx.upload_f32(buffer, data);
            Ok(buffer)
        };

        Ok(GpuGeometry {
            positions: upload(&self.positions[..])?,
            normals: upload(&self.normals[..])?,
            colors: upload(&self.colors[..])?,
            vertex_count: self.vertex_count,
        })
    }
}

fn vertices(array: &'static str, data: &[f32], components: usize) -> Result<usize, GeometryError> {
    if data.len() % components != 0 {
        return Err(GeometryError::Ragged {
            array,
            len: data.len(),
            components,
        });
    }
    Ok(data.len() / components)
}

// ── gpu side ──────────────────────────────────────────────────────────────

/// Vertex buffers holding one [`GeometryBuffer`].
#[derive(Debug)]
pub struct GpuGeometry<G: GraphicsApi> {
    pub positions: G::Buffer,
    pub normals: G::Buffer,
    pub colors: G::Buffer,
    pub vertex_count: usize,
}
