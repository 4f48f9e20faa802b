pub mod cache;
pub mod handle;
pub mod loader;
pub mod mesh;

pub use cache::AssetCache;
pub use handle::Handle;
pub use loader::{AssetError, GltfLoader, ModelLoader, PlaceholderLoader};
pub use mesh::Mesh;

/// Handle to a mesh that has been uploaded to a render device.
pub type MeshHandle = Handle<Mesh>;
