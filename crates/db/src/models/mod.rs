pub mod contribution;
pub mod entity;
