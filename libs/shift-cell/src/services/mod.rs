pub mod registry;

pub use registry::ShiftRegistryService;
