use std::sync::Arc;

use umbra_geom::IVec3;

use crate::colour::mul_colour_lightness;
use crate::model::{Model, VertexNormal};

/// Ambient term, attenuation and light direction for baking face colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lighting {
    pub ambient: i32,
    pub attenuation: i32,
    pub source: IVec3,
}

impl Lighting {
    pub const DEFAULT_SOURCE: IVec3 = IVec3::new(-50, -10, -50);

    pub fn new(ambient: i32, attenuation: i32, source: IVec3) -> Self {
        Self {
            ambient,
            attenuation,
            source,
        }
    }

    /// Lighting for a scenery loc with the given `ambient`/`contrast` definition values.
    pub fn for_loc(ambient: i32, contrast: i32) -> Self {
        Self::new(ambient + 64, contrast * 5 + 768, Self::DEFAULT_SOURCE)
    }

    /// Attenuation scaled by the light vector's length, never zero.
    #[inline]
    pub fn scaled_attenuation(&self) -> i32 {
        ((self.attenuation * self.source.length()) >> 8).max(1)
    }
}

impl Model {
    /// Computes face normals, accumulates smooth faces into vertex normals and
    /// bakes flat faces. With `apply` the Gouraud colours are finished
    /// immediately; otherwise the normals are kept for a later shared pass.
    pub fn calculate_normals(&mut self, light: &Lighting, apply: bool) {
        let attenuation = light.scaled_attenuation();
        let face_count = self.face_count();

        let mut normals = vec![VertexNormal::default(); self.vertex_count()];
        let mut colour_a = vec![0i32; face_count];
        for f in 0..face_count {
            let [a, b, c] = self.face(f);
            let va = self.vertex(a);
            let ab = self.vertex(b) - va;
            let ac = self.vertex(c) - va;
            let n = ab.cross(ac).shrink_to(8192).with_length(256);

            match self.info(f) {
                Some(info) if info & 1 != 0 => {
                    let lightness =
                        light.ambient + light.source.dot(n) / (attenuation + attenuation / 2);
                    colour_a[f] = mul_colour_lightness(self.face_colour[f], lightness, info);
                }
                _ => {
                    for v in [a, b, c] {
                        let vn = &mut normals[v];
                        vn.x += n.x;
                        vn.y += n.y;
                        vn.z += n.z;
                        vn.w += 1;
                    }
                }
            }
        }
        self.face_colour_a = Some(Arc::new(colour_a));
        self.vertex_normal = Some(normals);

        if apply {
            self.apply_lighting(light.ambient, attenuation, light.source);
            self.calculate_bounds_cylinder();
        } else {
            self.vertex_normal_original = self.vertex_normal.clone();
            self.calculate_bounds_aabb();
        }
    }

    /// Finishes Gouraud colours from the accumulated vertex normals. `attenuation`
    /// is already scaled by the light length.
    pub fn apply_lighting(&mut self, ambient: i32, attenuation: i32, source: IVec3) {
        let Some(normals) = self.vertex_normal.take() else {
            return;
        };
        let face_count = self.face_count();
        let attenuation = attenuation.max(1);
        let shade = |v: usize, colour: i32, info: i32| {
            let n = normals[v];
            let lit = ambient
                + (source.x * n.x + source.y * n.y + source.z * n.z) / (attenuation * n.w.max(1));
            mul_colour_lightness(colour, lit, info)
        };

        let mut colour_a = match self.face_colour_a.take() {
            Some(a) => Arc::unwrap_or_clone(a),
            None => vec![0; face_count],
        };
        let mut colour_b = vec![0i32; face_count];
        let mut colour_c = vec![0i32; face_count];
        for f in 0..face_count {
            let info = self.info(f).unwrap_or(0);
            let colour = self.face_colour[f];
            if info & 1 == 0 {
                let [a, b, c] = self.face(f);
                colour_a[f] = shade(a, colour, info);
                colour_b[f] = shade(b, colour, info);
                colour_c[f] = shade(c, colour, info);
            } else {
                colour_b[f] = colour_a[f];
                colour_c[f] = colour_a[f];
            }
        }
        self.face_colour_a = Some(Arc::new(colour_a));
        self.face_colour_b = Some(Arc::new(colour_b));
        self.face_colour_c = Some(Arc::new(colour_c));

        self.vertex_normal_original = None;
        self.vertex_label = None;
        self.face_label = None;
        self.label_vertices = None;
        self.label_faces = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::mul_colour_lightness;

    fn quad(info: Option<Vec<i32>>) -> Model {
        // unit quad in the XZ plane, both triangles facing -Y
        Model {
            vertex_x: Arc::new(vec![0, 128, 128, 0]),
            vertex_y: Arc::new(vec![0, 0, 0, 0]),
            vertex_z: Arc::new(vec![0, 0, 128, 128]),
            face_a: Arc::new(vec![0, 0]),
            face_b: Arc::new(vec![1, 2]),
            face_c: Arc::new(vec![2, 3]),
            face_colour: Arc::new(vec![0x2a7f, 0x2a7f]),
            face_info: info.map(Arc::new),
            ..Model::default()
        }
    }

    #[test]
    fn smooth_faces_share_vertex_normals() {
        let mut m = quad(None);
        m.calculate_normals(&Lighting::for_loc(0, 0), false);
        let normals = m.vertex_normal.as_ref().unwrap();
        assert_eq!(normals[0].w, 2);
        assert_eq!(normals[2].w, 2);
        assert_eq!(normals[1].w, 1);
        assert_eq!(normals[0].y, -512);
        assert_eq!(m.vertex_normal_original, m.vertex_normal);
        assert_eq!(m.bounds.max_x, 128);
        assert_eq!(m.bounds.min_z, 0);
    }

    #[test]
    fn applied_lighting_matches_the_formula() {
        let mut m = quad(None);
        let light = Lighting::new(64, 768, IVec3::new(0, -100, 0));
        m.calculate_normals(&light, true);
        let att = light.scaled_attenuation();
        assert_eq!(att, 768 * 100 >> 8);
        // vertex 0: normal (0, -512, 0) over two faces
        let expected = mul_colour_lightness(0x2a7f, 64 + (-100 * -512) / (att * 2), 0);
        assert_eq!(m.face_colour_a.as_ref().unwrap()[0], expected);
        assert!(m.vertex_normal.is_none());
        assert_eq!(m.bounds.radius, 181);
    }

    #[test]
    fn base_colours_survive_lighting() {
        let mut m = quad(Some(vec![0, 2]));
        m.calculate_normals(&Lighting::for_loc(0, 0), true);
        assert_eq!(*m.face_colour, vec![0x2a7f, 0x2a7f]);
        assert!(m.face_colour_c.is_some());
    }

    #[test]
    fn zero_light_vector_does_not_divide_by_zero() {
        let mut m = quad(Some(vec![1, 0]));
        m.calculate_normals(&Lighting::new(40, 768, IVec3::ZERO), true);
        assert_eq!(
            m.face_colour_a.as_ref().unwrap()[0],
            mul_colour_lightness(0x2a7f, 40, 1)
        );
    }
}
