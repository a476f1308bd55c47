pub mod point;
pub mod vector;
pub mod curves;
pub mod surfaces;
pub mod intersection;
pub mod hull;
