pub mod openelectricity;
pub mod windowed;

pub use openelectricity::OpenElectricityClient;
pub use windowed::{partition_windows, TimeWindow, WindowedFetcher, MAX_API_WINDOW_DAYS};
