mod decoded;
mod raw;

pub use decoded::*;
