pub mod batch;
pub mod quiz_loaders;

pub use batch::{BatchFn, Loader, LoaderConfig};
pub use quiz_loaders::Loaders;
