pub mod consolidate;
pub mod enrich;
pub mod offices;
pub mod providers;
pub mod recommend;
pub mod sampling;
pub mod scoring;
pub mod visits;
