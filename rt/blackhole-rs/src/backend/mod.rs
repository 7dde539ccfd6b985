pub mod programs;
mod software;

pub use software::SoftwareBackend;

use glam::Vec3;

use crate::geometry::{Point, Star};
use crate::pipeline::Pass;

/// Handle to a mesh owned by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

impl MeshId {
    /// Stand-in for an upload that failed; every pass using it is skipped
    pub const INVALID: MeshId = MeshId(u32::MAX);

    pub(crate) fn from_index(index: usize) -> Self {
        MeshId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub enum MeshData {
    Points(Vec<Point>),
    /// Indexed line list, two indices per segment
    Lines { vertices: Vec<Vec3>, indices: Vec<u32> },
    Stars(Vec<Star>),
}

impl MeshData {
    pub fn kind(&self) -> MeshKind {
        match self {
            MeshData::Points(_) => MeshKind::Points,
            MeshData::Lines { .. } => MeshKind::Lines,
            MeshData::Stars(_) => MeshKind::Stars,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            MeshData::Points(points) => points.len(),
            MeshData::Lines { vertices, .. } => vertices.len(),
            MeshData::Stars(stars) => stars.len(),
        }
    }

    fn validate(&self, label: &'static str) -> Result<(), BackendError> {
        if let MeshData::Lines { vertices, indices } = self {
            if indices.len() % 2 != 0 {
                return Err(BackendError::InvalidIndex {
                    label,
                    index: indices.len(),
                    len: vertices.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(BackendError::InvalidIndex {
                    label,
                    index: index as usize,
                    len: vertices.len(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Points,
    Lines,
    Stars,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("offscreen target {width}x{height} is incomplete")]
    IncompleteTarget { width: u32, height: u32 },

    #[error("unknown mesh handle {0:?}")]
    UnknownMesh(MeshId),

    #[error("mesh '{label}' is {actual:?}, pass expects {expected:?}")]
    WrongMeshKind {
        label: &'static str,
        expected: MeshKind,
        actual: MeshKind,
    },

    #[error("pass '{0}' needs the star layer, which was never created")]
    MissingTarget(&'static str),

    #[error("pass '{0}' samples the target it draws into")]
    FeedbackLoop(&'static str),

    #[error("mesh '{label}': index {index} out of range for {len} vertices")]
    InvalidIndex {
        label: &'static str,
        index: usize,
        len: usize,
    },
}

/// Everything the scene needs from a renderer. Meshes and the star layer
/// live as long as the backend; passes run one at a time, in order.
pub trait RenderBackend {
    fn upload(&mut self, label: &'static str, mesh: MeshData) -> Result<MeshId, BackendError>;

    /// Swap the contents of an existing mesh
    fn replace(&mut self, id: MeshId, mesh: MeshData) -> Result<(), BackendError>;

    /// Allocate the offscreen layer the star passes draw into
    fn create_star_layer(&mut self) -> Result<(), BackendError>;

    /// Screen size in pixels
    fn size(&self) -> (u32, u32);

    fn execute(&mut self, pass: &Pass) -> Result<(), BackendError>;
}
