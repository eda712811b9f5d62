pub mod codec;
pub mod model;
pub mod output;
pub mod rules;
pub mod scoring;
