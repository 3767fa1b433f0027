pub mod range;
pub(crate) mod url;
