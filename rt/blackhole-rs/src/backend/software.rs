use glam::{Vec2, Vec4};

use super::{programs, BackendError, MeshData, MeshId, MeshKind, RenderBackend};
use crate::pipeline::{Draw, Pass, RenderTarget};
use crate::raster::Framebuffer;

struct StoredMesh {
    label: &'static str,
    data: MeshData,
}

/// CPU rasterizer with a screen framebuffer and an optional star layer
/// of the same size
pub struct SoftwareBackend {
    screen: Framebuffer,
    star_layer: Option<Framebuffer>,
    meshes: Vec<StoredMesh>,
}

impl SoftwareBackend {
    pub fn new(width: u32, height: u32) -> Self {
        SoftwareBackend {
            screen: Framebuffer::new(width, height),
            star_layer: None,
            meshes: Vec::new(),
        }
    }

    /// Resize the screen and, if present, the star layer. Contents are lost.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen.resize(width, height);
        if let Some(layer) = self.star_layer.as_mut() {
            layer.resize(width, height);
        }
    }

    pub fn screen(&self) -> &Framebuffer {
        &self.screen
    }

    pub fn star_layer(&self) -> Option<&Framebuffer> {
        self.star_layer.as_ref()
    }

    pub fn vertex_count(&self, id: MeshId) -> Option<usize> {
        self.meshes.get(id.index()).map(|m| m.data.vertex_count())
    }

    /// Copy the screen into an RGBA8 frame of the same size
    pub fn copy_to(&self, frame: &mut [u8]) {
        self.screen.write_rgba8(frame);
    }

    pub fn read_pixels(&self) -> Vec<u8> {
        self.screen.to_rgba8()
    }
}

fn resolve(
    meshes: &[StoredMesh],
    id: MeshId,
    expected: MeshKind,
) -> Result<&MeshData, BackendError> {
    let mesh = meshes.get(id.index()).ok_or(BackendError::UnknownMesh(id))?;
    let actual = mesh.data.kind();
    if actual != expected {
        return Err(BackendError::WrongMeshKind {
            label: mesh.label,
            expected,
            actual,
        });
    }
    Ok(&mesh.data)
}

impl RenderBackend for SoftwareBackend {
    fn upload(&mut self, label: &'static str, mesh: MeshData) -> Result<MeshId, BackendError> {
        mesh.validate(label)?;
        log::debug!("upload '{}': {} vertices", label, mesh.vertex_count());
        self.meshes.push(StoredMesh { label, data: mesh });
        Ok(MeshId::from_index(self.meshes.len() - 1))
    }

    fn replace(&mut self, id: MeshId, mesh: MeshData) -> Result<(), BackendError> {
        let stored = self
            .meshes
            .get_mut(id.index())
            .ok_or(BackendError::UnknownMesh(id))?;
        mesh.validate(stored.label)?;
        log::debug!("replace '{}': {} vertices", stored.label, mesh.vertex_count());
        stored.data = mesh;
        Ok(())
    }

    fn create_star_layer(&mut self) -> Result<(), BackendError> {
        let (width, height) = self.size();
        if width == 0 || height == 0 {
            return Err(BackendError::IncompleteTarget { width, height });
        }
        self.star_layer = Some(Framebuffer::new(width, height));
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.screen.width(), self.screen.height())
    }

    fn execute(&mut self, pass: &Pass) -> Result<(), BackendError> {
        // resolve meshes before borrowing the targets
        let mesh = match &pass.draw {
            Draw::Stars { mesh, .. } => Some(resolve(&self.meshes, *mesh, MeshKind::Stars)?),
            Draw::Lines { mesh, .. } => Some(resolve(&self.meshes, *mesh, MeshKind::Lines)?),
            Draw::Points { mesh, .. } => Some(resolve(&self.meshes, *mesh, MeshKind::Points)?),
            Draw::Warp(_) | Draw::Text { .. } => None,
        };

        let (target, source) = match (pass.target, &pass.draw) {
            (RenderTarget::StarLayer, Draw::Warp(_)) => {
                return Err(BackendError::FeedbackLoop(pass.name))
            }
            (RenderTarget::StarLayer, _) => (
                self.star_layer
                    .as_mut()
                    .ok_or(BackendError::MissingTarget(pass.name))?,
                None,
            ),
            (RenderTarget::Screen, _) => (&mut self.screen, self.star_layer.as_ref()),
        };

        if let Some(color) = pass.clear {
            target.clear(color);
        }

        match (&pass.draw, mesh) {
            (Draw::Stars { view_proj, .. }, Some(MeshData::Stars(stars))) => {
                for star in stars {
                    let clip = *view_proj * star.position.extend(1.0);
                    target.draw_point(clip, star.size, pass.depth, pass.blend, |pc| {
                        programs::gaussian_star(pc, star.color)
                    });
                }
            }
            (Draw::Lines { mvp, color, .. }, Some(MeshData::Lines { vertices, indices })) => {
                for segment in indices.chunks_exact(2) {
                    let a = *mvp * vertices[segment[0] as usize].extend(1.0);
                    let b = *mvp * vertices[segment[1] as usize].extend(1.0);
                    if let Some(color) = programs::flat(*color) {
                        target.draw_line(a, b, color, pass.depth, pass.blend);
                    }
                }
            }
            (Draw::Points { mvp, point_size, .. }, Some(MeshData::Points(points))) => {
                for point in points {
                    let clip = *mvp * point.position().extend(1.0);
                    target.draw_point(clip, *point_size, pass.depth, pass.blend, |_| {
                        programs::square_point(point.color)
                    });
                }
            }
            (Draw::Warp(uniforms), _) => {
                let source = source.ok_or(BackendError::MissingTarget(pass.name))?;
                target.shade_fullscreen(pass.blend, |uv| {
                    programs::star_warp(source, uv, uniforms)
                });
            }
            (Draw::Text { points, point_size }, _) => {
                for p in points {
                    let ndc = Vec2::from_array(p.position) * 2.0 - Vec2::ONE;
                    let clip = Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
                    target.draw_point(clip, *point_size, pass.depth, pass.blend, |pc| {
                        programs::text_dot(pc, p.color)
                    });
                }
            }
            // kinds were checked when the mesh was resolved
            _ => {}
        }
        Ok(())
    }
}
