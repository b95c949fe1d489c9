pub(crate) mod proj;
pub(crate) mod repair;
mod split;
