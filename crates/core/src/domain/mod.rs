pub mod crop;
pub mod farmer;
pub mod plan;
pub mod timeline;
