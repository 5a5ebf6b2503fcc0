use std::sync::Arc;

use hashbrown::HashMap;

use crate::model::{FacePriorities, Model};

struct Merger {
    index: HashMap<(i32, i32, i32), u32>,
    x: Vec<i32>,
    y: Vec<i32>,
    z: Vec<i32>,
    labels: Option<Vec<u8>>,
}

impl Merger {
    /// Returns the merged index of a source vertex, reusing any vertex already
    /// added at the same position.
    fn add_vertex(&mut self, model: &Model, v: usize) -> u32 {
        let key = (model.vertex_x[v], model.vertex_y[v], model.vertex_z[v]);
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.x.len() as u32;
        self.x.push(key.0);
        self.y.push(key.1);
        self.z.push(key.2);
        if let Some(labels) = self.labels.as_mut() {
            labels.push(model.vertex_label.as_ref().map_or(0, |l| l[v]));
        }
        self.index.insert(key, i);
        i
    }
}

impl Model {
    /// Concatenates models into one, sharing vertices that coincide exactly.
    pub fn merge(models: &[&Model]) -> Model {
        let mut vertex_total = 0;
        let mut face_total = 0;
        let mut textured_total = 0;
        let mut has_info = false;
        let mut has_priorities = false;
        let mut has_alpha = false;
        let mut has_face_labels = false;
        let mut has_vertex_labels = false;
        let mut constant: Option<u8> = None;
        for m in models {
            vertex_total += m.vertex_count();
            face_total += m.face_count();
            textured_total += m.textured_face_count();
            has_info |= m.face_info.is_some();
            match &m.face_priority {
                FacePriorities::PerFace(_) => has_priorities = true,
                FacePriorities::Constant(p) => match constant {
                    None => constant = Some(*p),
                    Some(c) if c != *p => has_priorities = true,
                    Some(_) => {}
                },
            }
            has_alpha |= m.face_alpha.is_some();
            has_face_labels |= m.face_label.is_some();
            has_vertex_labels |= m.vertex_label.is_some();
        }

        let mut merger = Merger {
            index: HashMap::with_capacity(vertex_total),
            x: Vec::with_capacity(vertex_total),
            y: Vec::with_capacity(vertex_total),
            z: Vec::with_capacity(vertex_total),
            labels: has_vertex_labels.then(|| Vec::with_capacity(vertex_total)),
        };
        let mut face_a = Vec::with_capacity(face_total);
        let mut face_b = Vec::with_capacity(face_total);
        let mut face_c = Vec::with_capacity(face_total);
        let mut colour = Vec::with_capacity(face_total);
        let mut info = has_info.then(|| Vec::with_capacity(face_total));
        let mut priority = has_priorities.then(|| Vec::with_capacity(face_total));
        let mut alpha = has_alpha.then(|| Vec::with_capacity(face_total));
        let mut face_label = has_face_labels.then(|| Vec::with_capacity(face_total));
        let mut textured_a = Vec::with_capacity(textured_total);
        let mut textured_b = Vec::with_capacity(textured_total);
        let mut textured_c = Vec::with_capacity(textured_total);

        for m in models {
            let textured_offset = textured_a.len() as i32;
            for f in 0..m.face_count() {
                if let Some(out) = info.as_mut() {
                    let mut i = m.info(f).unwrap_or(0);
                    if i & 2 == 2 {
                        i += textured_offset << 2;
                    }
                    out.push(i);
                }
                if let Some(out) = priority.as_mut() {
                    out.push(m.face_priority.get(f));
                }
                if let Some(out) = alpha.as_mut() {
                    out.push(m.face_alpha.as_ref().map_or(0, |a| a[f]));
                }
                if let Some(out) = face_label.as_mut() {
                    out.push(m.face_label.as_ref().map_or(0, |l| l[f]));
                }
                colour.push(m.face_colour[f]);
                let [a, b, c] = m.face(f);
                face_a.push(merger.add_vertex(m, a));
                face_b.push(merger.add_vertex(m, b));
                face_c.push(merger.add_vertex(m, c));
            }
            for t in 0..m.textured_face_count() {
                textured_a.push(merger.add_vertex(m, m.textured_a[t] as usize));
                textured_b.push(merger.add_vertex(m, m.textured_b[t] as usize));
                textured_c.push(merger.add_vertex(m, m.textured_c[t] as usize));
            }
        }

        Model {
            vertex_x: Arc::new(merger.x),
            vertex_y: Arc::new(merger.y),
            vertex_z: Arc::new(merger.z),
            vertex_label: merger.labels.map(Arc::new),
            face_a: Arc::new(face_a),
            face_b: Arc::new(face_b),
            face_c: Arc::new(face_c),
            face_colour: Arc::new(colour),
            face_info: info.map(Arc::new),
            face_priority: match priority {
                Some(p) => FacePriorities::PerFace(Arc::new(p)),
                None => FacePriorities::Constant(constant.unwrap_or(0)),
            },
            face_alpha: alpha.map(Arc::new),
            face_label: face_label.map(Arc::new),
            textured_a: Arc::new(textured_a),
            textured_b: Arc::new(textured_b),
            textured_c: Arc::new(textured_c),
            ..Model::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(offset: i32, priority: u8) -> Model {
        Model {
            vertex_x: Arc::new(vec![0, 128, offset]),
            vertex_y: Arc::new(vec![0, 0, 0]),
            vertex_z: Arc::new(vec![0, 0, 128]),
            face_a: Arc::new(vec![0]),
            face_b: Arc::new(vec![1]),
            face_c: Arc::new(vec![2]),
            face_colour: Arc::new(vec![offset]),
            face_priority: FacePriorities::Constant(priority),
            ..Model::default()
        }
    }

    #[test]
    fn coincident_vertices_are_shared() {
        let a = tri(0, 3);
        let b = tri(128, 3);
        let m = Model::merge(&[&a, &b]);
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.face_count(), 2);
        assert_eq!(m.face(1), [0, 1, 3]);
        assert_eq!(*m.face_colour, vec![0, 128]);
        assert_eq!(m.face_priority, FacePriorities::Constant(3));
    }

    #[test]
    fn differing_priorities_become_per_face() {
        let m = Model::merge(&[&tri(0, 3), &tri(64, 5)]);
        assert!(m.has_face_priorities());
        assert_eq!(m.face_priority.get(0), 3);
        assert_eq!(m.face_priority.get(1), 5);
    }

    #[test]
    fn textured_info_is_rebased() {
        let mut a = tri(0, 0);
        a.face_info = Some(Arc::new(vec![2]));
        a.textured_a = Arc::new(vec![0]);
        a.textured_b = Arc::new(vec![1]);
        a.textured_c = Arc::new(vec![2]);
        let b = a.clone();
        let m = Model::merge(&[&a, &b]);
        assert_eq!(m.textured_face_count(), 2);
        assert_eq!(m.info(0), Some(2));
        assert_eq!(m.info(1), Some(2 + (1 << 2)));
    }
}
