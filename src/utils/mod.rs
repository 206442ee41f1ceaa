pub mod format;
pub mod hijri;
pub mod time_math;
