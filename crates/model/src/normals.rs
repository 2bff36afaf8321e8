//! Lighting normals and texture mapping derived from decoded geometry.

use crate::definition::{FaceNormal, FaceUv, ModelDefinition, Vertex, VertexNormal};

/// Components are halved until they all fit in this range.
const NORMAL_LIMIT: i64 = 8192;
/// Fixed-point length of a face normal.
const NORMAL_SCALE: i64 = 256;

/// UVs for a textured face with no texture triangle.
const DEFAULT_UV: FaceUv = FaceUv {
    u: [0.0, 1.0, 0.0],
    v: [1.0, 1.0, 0.0],
};

impl ModelDefinition {
    /// Fill [`vertex_normals`](Self::vertex_normals) and
    /// [`face_normals`](Self::face_normals).
    ///
    /// Smooth faces add their normal to each of their vertices. Flat faces
    /// keep their own normal instead.
    pub fn compute_normals(&mut self) {
        let mut vertex_normals = vec![VertexNormal::default(); self.vertex_count()];
        let mut face_normals = vec![None; self.face_count()];

        for (face, &[a, b, c]) in self.faces.iter().enumerate() {
            let (Some(a), Some(b), Some(c)) = (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let [x, y, z] = face_normal(*a, *b, *c);

            if self.face_render_type(face) == 0 {
                for vertex in self.faces[face] {
                    if let Some(normal) = vertex_normals.get_mut(vertex) {
                        normal.x += x;
                        normal.y += y;
                        normal.z += z;
                        normal.magnitude += 1;
                    }
                }
            } else {
                face_normals[face] = Some(FaceNormal { x, y, z });
            }
        }

        self.vertex_normals = vertex_normals;
        self.face_normals = face_normals;
    }

    /// Fill [`face_uvs`](Self::face_uvs) for textured models.
    ///
    /// Faces are mapped by projecting their corners onto the plane spanned
    /// by their texture triangle. Only planar textures (render type 0) are
    /// projected; other textured faces map to zero.
    pub fn compute_texture_uv_coordinates(&mut self) {
        let Some(textures) = &self.face_textures else {
            self.face_uvs = None;
            return;
        };

        let uvs = self
            .faces
            .iter()
            .enumerate()
            .map(|(face, corners)| {
                if textures.get(face).copied().flatten().is_none() {
                    return FaceUv::default();
                }
                let coordinate = self
                    .texture_coordinates
                    .as_ref()
                    .and_then(|coordinates| coordinates.get(face).copied().flatten())
                    .map(usize::from);
                match coordinate {
                    None => DEFAULT_UV,
                    Some(triangle) => self.project(triangle, corners).unwrap_or_default(),
                }
            })
            .collect();
        self.face_uvs = Some(uvs);
    }

    fn project(&self, triangle: usize, corners: &[usize; 3]) -> Option<FaceUv> {
        if self.texture_render_types.get(triangle).copied() != Some(0) {
            return None;
        }
        let [p, m, n] = self.texture_triangles.get(triangle)?.map(|vertex| self.vertices.get(vertex).copied());
        let (p, m, n) = (position(p?), position(m?), position(n?));

        let m = sub(m, p);
        let n = sub(n, p);
        let normal = cross(m, n);
        let a = cross(n, normal);
        let b = cross(m, normal);
        let u_span = dot(a, m);
        let v_span = dot(b, n);
        if u_span == 0.0 || v_span == 0.0 {
            return None;
        }

        let mut uv = FaceUv::default();
        for (corner, &vertex) in corners.iter().enumerate() {
            let offset = sub(position(*self.vertices.get(vertex)?), p);
            uv.u[corner] = dot(a, offset) / u_span;
            uv.v[corner] = dot(b, offset) / v_span;
        }
        Some(uv)
    }
}

/// Fixed-point normal of the face `a, b, c`, scaled to length 256.
fn face_normal(a: Vertex, b: Vertex, c: Vertex) -> [i32; 3] {
    let ab = [b.x - a.x, b.y - a.y, b.z - a.z].map(i64::from);
    let ac = [c.x - a.x, c.y - a.y, c.z - a.z].map(i64::from);
    let mut normal = [
        ab[1] * ac[2] - ac[1] * ab[2],
        ab[2] * ac[0] - ac[2] * ab[0],
        ab[0] * ac[1] - ac[0] * ab[1],
    ];
    while normal.iter().any(|component| !(-NORMAL_LIMIT..=NORMAL_LIMIT).contains(component)) {
        normal = normal.map(|component| component >> 1);
    }

    let [x, y, z] = normal;
    let length = ((x * x + y * y + z * z) as f64).sqrt() as i64;
    let length = length.max(1);
    // Bounded by the scale, so always fits.
    normal.map(|component| (component * NORMAL_SCALE / length) as i32)
}

fn position(vertex: Vertex) -> [f32; 3] {
    [vertex.x as f32, vertex.y as f32, vertex.z as f32]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ModelDefinition {
        ModelDefinition {
            vertices: vec![
                Vertex { x: 0, y: 0, z: 0 },
                Vertex { x: 10, y: 0, z: 0 },
                Vertex { x: 0, y: 10, z: 0 },
            ],
            faces: vec![[0, 1, 2]],
            face_colours: vec![0],
            ..Default::default()
        }
    }

    #[test]
    fn smooth_faces_accumulate_on_vertices() {
        let mut model = triangle();
        model.compute_normals();
        assert_eq!(model.face_normals, vec![None]);
        assert_eq!(model.vertex_normals.len(), 3);
        for normal in &model.vertex_normals {
            assert_eq!(
                *normal,
                VertexNormal {
                    x: 0,
                    y: 0,
                    z: 256,
                    magnitude: 1
                }
            );
        }
    }

    #[test]
    fn shared_vertices_sum_normals() {
        let mut model = triangle();
        model.vertices.push(Vertex { x: 10, y: 10, z: 0 });
        model.faces.push([1, 3, 2]);
        model.face_colours.push(0);
        model.compute_normals();
        assert_eq!(model.vertex_normals[0].magnitude, 1);
        assert_eq!(model.vertex_normals[1].magnitude, 2);
        assert_eq!(model.vertex_normals[1].z, 512);
        assert_eq!(model.vertex_normals[3].z, 256);
    }

    #[test]
    fn flat_faces_keep_their_own_normal() {
        let mut model = triangle();
        model.face_render_types = Some(vec![1]);
        model.compute_normals();
        assert_eq!(model.face_normals, vec![Some(FaceNormal { x: 0, y: 0, z: 256 })]);
        assert!(model.vertex_normals.iter().all(|normal| normal.magnitude == 0));
    }

    #[test]
    fn large_faces_are_scaled_down() {
        assert_eq!(
            face_normal(
                Vertex { x: 0, y: 0, z: 0 },
                Vertex { x: 30_000, y: 0, z: 0 },
                Vertex { x: 0, y: 30_000, z: 0 },
            ),
            [0, 0, 256]
        );
    }

    #[test]
    fn degenerate_face() {
        let vertex = Vertex { x: 5, y: 5, z: 5 };
        assert_eq!(face_normal(vertex, vertex, vertex), [0, 0, 0]);
    }

    #[test]
    fn untextured_models_have_no_uvs() {
        let mut model = triangle();
        model.compute_texture_uv_coordinates();
        assert!(model.face_uvs.is_none());
    }

    #[test]
    fn textured_face_without_triangle_uses_default_uvs() {
        let mut model = triangle();
        model.face_textures = Some(vec![Some(3)]);
        model.compute_texture_uv_coordinates();
        assert_eq!(model.face_uvs, Some(vec![DEFAULT_UV]));
    }

    #[test]
    fn planar_projection() {
        let mut model = triangle();
        model.face_textures = Some(vec![Some(3)]);
        model.texture_coordinates = Some(vec![Some(0)]);
        model.texture_render_types = vec![0];
        model.texture_triangles = vec![[0, 1, 2]];
        model.compute_texture_uv_coordinates();

        let uvs = model.face_uvs.unwrap();
        assert_eq!(uvs[0].u, [0.0, 1.0, 0.0]);
        assert_eq!(uvs[0].v, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn non_planar_textures_map_to_zero() {
        let mut model = triangle();
        model.face_textures = Some(vec![Some(3)]);
        model.texture_coordinates = Some(vec![Some(0)]);
        model.texture_render_types = vec![1];
        model.texture_triangles = vec![[0, 0, 0]];
        model.compute_texture_uv_coordinates();
        assert_eq!(model.face_uvs, Some(vec![FaceUv::default()]));
    }

    #[test]
    fn untextured_face_in_textured_model() {
        let mut model = triangle();
        model.face_textures = Some(vec![None]);
        model.compute_texture_uv_coordinates();
        assert_eq!(model.face_uvs, Some(vec![FaceUv::default()]));
    }
}
