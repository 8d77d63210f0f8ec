mod parking_dto;

pub use parking_dto::*;
