/// Three vertex indices.
pub type Triangle = [usize; 3];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Sum of the normals of every smooth face touching a vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexNormal {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Number of faces accumulated.
    pub magnitude: i32,
}

impl VertexNormal {
    /// Unit-length direction of the accumulated normal.
    pub fn normalize(&self) -> [f32; 3] {
        let [x, y, z] = [self.x, self.y, self.z].map(i64::from);
        let length = ((x * x + y * y + z * z) as f64).sqrt() as i64;
        let length = length.max(1) as f32;
        [self.x as f32 / length, self.y as f32 / length, self.z as f32 / length]
    }
}

/// Normal of a flat-shaded face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceNormal {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Texture coordinates of the three corners of a face.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaceUv {
    pub u: [f32; 3],
    pub v: [f32; 3],
}

/// A decoded model.
///
/// Per-face attributes are parallel to [`faces`](Self::faces). Optional
/// attributes are `None` when the model does not carry them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDefinition {
    pub id: u32,
    pub vertices: Vec<Vertex>,
    pub vertex_skins: Option<Vec<u8>>,

    pub faces: Vec<Triangle>,
    /// Packed 16-bit HSL colour per face.
    pub face_colours: Vec<u16>,
    /// 0 = smooth, 1 = flat.
    pub face_render_types: Option<Vec<u8>>,
    pub face_priorities: Option<Vec<u8>>,
    /// Model-wide priority when there are no per-face priorities.
    pub priority: u8,
    pub face_transparencies: Option<Vec<u8>>,
    pub face_skins: Option<Vec<u8>>,
    /// Texture id per face.
    pub face_textures: Option<Vec<Option<u16>>>,
    /// Texture triangle per face.
    pub texture_coordinates: Option<Vec<Option<u8>>>,

    pub texture_render_types: Vec<u8>,
    /// Vertex indices spanning each texture's projection. Only meaningful
    /// for render type 0.
    pub texture_triangles: Vec<Triangle>,

    /// Filled by [`compute_normals`](Self::compute_normals).
    pub vertex_normals: Vec<VertexNormal>,
    pub face_normals: Vec<Option<FaceNormal>>,
    /// Filled by [`compute_texture_uv_coordinates`](Self::compute_texture_uv_coordinates).
    pub face_uvs: Option<Vec<FaceUv>>,
}

impl ModelDefinition {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn face_texture(&self, face: usize) -> Option<u16> {
        self.face_textures.as_ref().and_then(|textures| textures.get(face).copied().flatten())
    }

    pub fn face_transparency(&self, face: usize) -> u8 {
        self.face_transparencies
            .as_ref()
            .and_then(|alphas| alphas.get(face).copied())
            .unwrap_or(0)
    }

    pub fn face_render_type(&self, face: usize) -> u8 {
        self.face_render_types
            .as_ref()
            .and_then(|types| types.get(face).copied())
            .unwrap_or(0)
    }
}
