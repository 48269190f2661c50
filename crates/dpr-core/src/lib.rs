pub mod compute;
pub mod consts;
pub mod denoise;
pub mod dpr;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod params;
pub mod pipeline;
pub mod stack;
