//! Packs a `Model` back into the blob layout `Model::decode` reads. Faces that
//! continue a strip from the previous face use the short orientation codes.

use crate::model::{FacePriorities, Model};
use crate::packet::PacketWriter;

pub fn encode(model: &Model) -> Vec<u8> {
    let vertex_count = model.vertex_count();
    let face_count = model.face_count();

    let mut flags = PacketWriter::new();
    let mut xs = PacketWriter::new();
    let mut ys = PacketWriter::new();
    let mut zs = PacketWriter::new();
    let (mut px, mut py, mut pz) = (0, 0, 0);
    for v in 0..vertex_count {
        let (x, y, z) = (model.vertex_x[v], model.vertex_y[v], model.vertex_z[v]);
        let mut flag = 0;
        if x != px {
            flag |= 1;
            xs.psmarts(x - px);
        }
        if y != py {
            flag |= 2;
            ys.psmarts(y - py);
        }
        if z != pz {
            flag |= 4;
            zs.psmarts(z - pz);
        }
        flags.p1(flag);
        (px, py, pz) = (x, y, z);
    }

    let mut orientations = PacketWriter::new();
    let mut vertices = PacketWriter::new();
    let (mut a, mut b, mut c, mut last) = (-1i64, -1i64, -1i64, 0i32);
    for f in 0..face_count {
        let [fa, fb, fc] = model.face(f).map(|i| i as i64);
        let code = if f > 0 && fa == a && fb == c {
            2
        } else if f > 0 && fa == c && fb == b {
            3
        } else if f > 0 && fa == b && fb == a {
            4
        } else {
            1
        };
        orientations.p1(code);
        if code == 1 {
            vertices.psmarts(fa as i32 - last);
            vertices.psmarts(fb as i32 - fa as i32);
            vertices.psmarts(fc as i32 - fb as i32);
        } else {
            vertices.psmarts(fc as i32 - last);
        }
        last = fc as i32;
        (a, b, c) = (fa, fb, fc);
    }

    let mut body = PacketWriter::new();
    body.extend(&flags.data);
    body.extend(&orientations.data);
    let priority = match &model.face_priority {
        FacePriorities::PerFace(p) => {
            body.extend(p);
            255
        }
        FacePriorities::Constant(p) => *p,
    };
    if let Some(labels) = &model.face_label {
        body.extend(labels);
    }
    if let Some(info) = &model.face_info {
        for &i in info.iter() {
            body.p1(i as u8);
        }
    }
    if let Some(labels) = &model.vertex_label {
        body.extend(labels);
    }
    if let Some(alpha) = &model.face_alpha {
        for &a in alpha.iter() {
            body.p1(a as u8);
        }
    }
    body.extend(&vertices.data);
    for &colour in model.face_colour.iter() {
        body.p2(colour as u16);
    }
    for t in 0..model.textured_face_count() {
        body.p2(model.textured_a[t] as u16);
        body.p2(model.textured_b[t] as u16);
        body.p2(model.textured_c[t] as u16);
    }
    body.extend(&xs.data);
    body.extend(&ys.data);
    body.extend(&zs.data);

    body.p2(vertex_count as u16);
    body.p2(face_count as u16);
    body.p1(model.textured_face_count() as u8);
    body.p1(model.face_info.is_some() as u8);
    body.p1(priority);
    body.p1(model.face_alpha.is_some() as u8);
    body.p1(model.face_label.is_some() as u8);
    body.p1(model.vertex_label.is_some() as u8);
    body.p2(xs.len() as u16);
    body.p2(ys.len() as u16);
    body.p2(zs.len() as u16);
    body.p2(vertices.len() as u16);
    body.data
}
