mod arena;
mod handle;
mod node;
mod raw_threaded_map;

pub(crate) use handle::Handle;
pub(crate) use raw_threaded_map::RawThreadedMap;
