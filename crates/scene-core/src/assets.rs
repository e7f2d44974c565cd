//! Reveal assets: one-shot load slots and host-side decoding.

use crate::error::AssetError;
use glam::Vec3;

/// Load state of an asset that is fetched once, outside the frame loop.
///
/// `Failed` is terminal; nothing retries.
#[derive(Clone, Debug)]
pub enum AssetSlot<T> {
    Pending,
    Ready(T),
    Failed,
}

impl<T> Default for AssetSlot<T> {
    fn default() -> Self {
        AssetSlot::Pending
    }
}

impl<T> AssetSlot<T> {
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, AssetSlot::Ready(_))
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, AssetSlot::Failed)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            AssetSlot::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Settle a pending slot from a load result. Already-settled slots are
    /// left untouched.
    pub fn settle<E>(&mut self, result: Result<T, E>) {
        if matches!(self, AssetSlot::Pending) {
            *self = match result {
                Ok(v) => AssetSlot::Ready(v),
                Err(_) => AssetSlot::Failed,
            };
        }
    }
}

/// What the phase sequencer needs to know about the reveal assets this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetPresence {
    pub model_ready: bool,
    pub image_ready: bool,
}

/// Indexed triangle mesh, recentred on the origin and scaled to unit radius.
#[derive(Clone, Debug, Default)]
pub struct ModelMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ModelMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Clone, Debug)]
pub struct ImagePixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImagePixels {
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Decode a self-contained glTF (GLB or JSON with embedded buffers).
///
/// All triangle primitives of all meshes are merged. Missing normals are
/// computed by area-weighted averaging.
pub fn decode_model(bytes: &[u8]) -> Result<ModelMesh, AssetError> {
    let (doc, buffers, _images) = gltf::import_slice(bytes).map_err(|e| AssetError::Decode {
        kind: "model",
        reason: e.to_string(),
    })?;

    let mut mesh = ModelMesh::default();
    let mut any_normals_missing = false;
    for m in doc.meshes() {
        for prim in m.primitives() {
            if prim.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader = prim.reader(|b| buffers.get(b.index()).map(|d| &d.0[..]));
            let Some(pos_iter) = reader.read_positions() else {
                continue;
            };
            let base = mesh.positions.len() as u32;
            let positions: Vec<[f32; 3]> = pos_iter.collect();
            let count = positions.len();
            mesh.positions.extend(positions);
            match reader.read_normals() {
                Some(n) => mesh.normals.extend(n),
                None => {
                    any_normals_missing = true;
                    mesh.normals.extend(std::iter::repeat([0.0; 3]).take(count));
                }
            }
            match reader.read_indices() {
                Some(ix) => mesh.indices.extend(ix.into_u32().map(|i| base + i)),
                None => mesh.indices.extend((0..count as u32).map(|i| base + i)),
            }
        }
    }
    if mesh.indices.len() < 3 {
        return Err(AssetError::EmptyModel);
    }
    if any_normals_missing {
        compute_normals(&mut mesh);
    }
    normalize_extent(&mut mesh);
    log::debug!(
        "decoded model: {} vertices, {} triangles",
        mesh.positions.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

pub fn decode_image(bytes: &[u8]) -> Result<ImagePixels, AssetError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AssetError::Decode {
            kind: "image",
            reason: e.to_string(),
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(ImagePixels {
        width,
        height,
        rgba: img.into_raw(),
    })
}

fn compute_normals(mesh: &mut ModelMesh) {
    let mut acc = vec![Vec3::ZERO; mesh.positions.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= acc.len() || b >= acc.len() || c >= acc.len() {
            continue;
        }
        let pa = Vec3::from(mesh.positions[a]);
        let pb = Vec3::from(mesh.positions[b]);
        let pc = Vec3::from(mesh.positions[c]);
        // Unnormalised cross product weights by triangle area.
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    mesh.normals = acc
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect();
}

fn normalize_extent(mesh: &mut ModelMesh) {
    let (mut lo, mut hi) = (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
    for p in &mesh.positions {
        let v = Vec3::from(*p);
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let center = (lo + hi) * 0.5;
    let radius = mesh
        .positions
        .iter()
        .map(|p| (Vec3::from(*p) - center).length())
        .fold(0.0f32, f32::max);
    let scale = if radius > 0.0 { 1.0 / radius } else { 1.0 };
    for p in &mut mesh.positions {
        *p = ((Vec3::from(*p) - center) * scale).to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_is_one_shot() {
        let mut slot: AssetSlot<u32> = AssetSlot::Pending;
        slot.settle::<()>(Ok(4));
        assert!(slot.is_ready());
        slot.settle(Err("late failure"));
        assert_eq!(slot.ready(), Some(&4));

        let mut failed: AssetSlot<u32> = AssetSlot::default();
        failed.settle(Err("404"));
        assert!(failed.is_failed());
        failed.settle::<()>(Ok(1));
        assert!(failed.is_failed());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_image(b"definitely not a png").unwrap_err();
        assert!(matches!(err, AssetError::Decode { kind: "image", .. }));
        let err = decode_model(b"{ nope").unwrap_err();
        assert!(matches!(err, AssetError::Decode { kind: "model", .. }));
    }

    #[test]
    fn normals_point_out_of_ccw_triangle() {
        let mut mesh = ModelMesh {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![],
            indices: vec![0, 1, 2],
        };
        compute_normals(&mut mesh);
        for n in &mesh.normals {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
    }
}
